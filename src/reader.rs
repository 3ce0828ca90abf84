// Copyright (c) 2021, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The reader contract this crate consumes but does not implement.
//!
//! The byte-level parser is an external collaborator (see the purpose and
//! scope notes in `DESIGN.md`); this module only declares the trait the
//! writer's `write_all_values` and the path extractor drive. A minimal
//! in-memory implementation is provided under `#[cfg(any(test, feature =
//! "test-util"))]` so the extractor's matching algorithm and the writer's
//! copy-from-reader path can be exercised without a real decoder.

use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::error::Result;
use crate::symbol::Symbol;
use crate::timestamp::Timestamp;

/// The type of the value the reader is currently positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl IonType {
    /// True for `List`, `Sexp`, and `Struct`.
    pub fn is_container(&self) -> bool {
        matches!(self, IonType::List | IonType::Sexp | IonType::Struct)
    }
}

/// The reader contract consumed by the writer's `write_all_values` and by
/// the path extractor (spec section 6).
pub trait Reader {
    /// Advances to the next value at the current depth. Returns `None` at
    /// the end of the current container (or stream, at depth 0).
    fn next(&mut self) -> Result<Option<IonType>>;

    /// Steps into the container the reader is currently positioned on.
    fn step_in(&mut self) -> Result<()>;

    /// Steps out of the container the reader is currently inside.
    fn step_out(&mut self) -> Result<()>;

    /// Current nesting depth (0 at the top level).
    fn depth(&self) -> usize;

    /// True if the current value is a typed null.
    fn is_null(&self) -> bool;

    /// The field name of the current value, if positioned inside a struct.
    fn field_name_symbol(&self) -> Option<Symbol>;

    /// The annotations on the current value, in declaration order.
    fn annotation_symbols(&self) -> Vec<Symbol>;

    /// Byte offset of the current value in the underlying stream, if known.
    fn value_offset(&self) -> Option<u64>;

    /// Byte length of the current value's encoding, if known.
    fn value_length(&self) -> Option<u64>;

    /// Repositions the reader, if the underlying stream supports seeking.
    fn seek(&mut self, offset: u64, length: Option<u64>) -> Result<()>;

    fn read_bool(&self) -> Result<bool>;
    fn read_int(&self) -> Result<BigInt>;
    fn read_float(&self) -> Result<f64>;
    fn read_decimal(&self) -> Result<Decimal>;
    fn read_timestamp(&self) -> Result<Timestamp>;
    fn read_symbol(&self) -> Result<Symbol>;
    fn read_string(&self) -> Result<String>;
    fn read_blob(&self) -> Result<Vec<u8>>;
    fn read_clob(&self) -> Result<Vec<u8>>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    //! An in-memory tree reader used to exercise the extractor and the
    //! writer's reader-driven copy path without a real binary/text decoder.

    use super::*;
    use crate::error::IonError;

    /// A tree-shaped Ion value, built directly in memory for tests.
    #[derive(Debug, Clone)]
    pub enum TreeValue {
        Null,
        Bool(bool),
        Int(i64),
        String(String),
        Symbol(String),
        List(Vec<TreeValue>),
        Struct(Vec<(String, TreeValue)>),
    }

    struct Frame {
        items: Vec<(Option<String>, TreeValue)>,
        index: isize,
    }

    /// Drives a [`TreeValue`] forest through the [`Reader`] contract.
    pub struct TreeReader {
        stack: Vec<Frame>,
    }

    impl TreeReader {
        /// Creates a reader over a sequence of top-level values.
        pub fn new(top_level: Vec<TreeValue>) -> TreeReader {
            let items = top_level.into_iter().map(|v| (None, v)).collect();
            TreeReader {
                stack: vec![Frame { items, index: -1 }],
            }
        }

        fn current(&self) -> &(Option<String>, TreeValue) {
            let frame = self.stack.last().expect("non-empty stack");
            &frame.items[frame.index as usize]
        }

        fn type_of(v: &TreeValue) -> IonType {
            match v {
                TreeValue::Null => IonType::Null,
                TreeValue::Bool(_) => IonType::Bool,
                TreeValue::Int(_) => IonType::Int,
                TreeValue::String(_) => IonType::String,
                TreeValue::Symbol(_) => IonType::Symbol,
                TreeValue::List(_) => IonType::List,
                TreeValue::Struct(_) => IonType::Struct,
            }
        }
    }

    impl Reader for TreeReader {
        fn next(&mut self) -> Result<Option<IonType>> {
            let frame = self.stack.last_mut().expect("non-empty stack");
            let next_index = frame.index + 1;
            if next_index as usize >= frame.items.len() {
                return Ok(None);
            }
            frame.index = next_index;
            Ok(Some(Self::type_of(&frame.items[next_index as usize].1)))
        }

        fn step_in(&mut self) -> Result<()> {
            let items = match &self.current().1 {
                TreeValue::List(items) => items.iter().map(|v| (None, v.clone())).collect(),
                TreeValue::Struct(fields) => fields
                    .iter()
                    .map(|(k, v)| (Some(k.clone()), v.clone()))
                    .collect(),
                _ => return Err(IonError::InvalidState("cannot step into a scalar")),
            };
            self.stack.push(Frame { items, index: -1 });
            Ok(())
        }

        fn step_out(&mut self) -> Result<()> {
            if self.stack.len() <= 1 {
                return Err(IonError::InvalidState("already at top level"));
            }
            self.stack.pop();
            Ok(())
        }

        fn depth(&self) -> usize {
            self.stack.len() - 1
        }

        fn is_null(&self) -> bool {
            matches!(self.current().1, TreeValue::Null)
        }

        fn field_name_symbol(&self) -> Option<Symbol> {
            self.current().0.clone().map(Symbol::from_text)
        }

        fn annotation_symbols(&self) -> Vec<Symbol> {
            Vec::new()
        }

        fn value_offset(&self) -> Option<u64> {
            None
        }

        fn value_length(&self) -> Option<u64> {
            None
        }

        fn seek(&mut self, _offset: u64, _length: Option<u64>) -> Result<()> {
            Err(IonError::NotImplemented("TreeReader does not support seeking"))
        }

        fn read_bool(&self) -> Result<bool> {
            match self.current().1 {
                TreeValue::Bool(b) => Ok(b),
                _ => Err(IonError::InvalidState("not a bool")),
            }
        }

        fn read_int(&self) -> Result<BigInt> {
            match self.current().1 {
                TreeValue::Int(i) => Ok(BigInt::from(i)),
                _ => Err(IonError::InvalidState("not an int")),
            }
        }

        fn read_float(&self) -> Result<f64> {
            Err(IonError::NotImplemented("TreeReader has no float variant"))
        }

        fn read_decimal(&self) -> Result<Decimal> {
            Err(IonError::NotImplemented("TreeReader has no decimal variant"))
        }

        fn read_timestamp(&self) -> Result<Timestamp> {
            Err(IonError::NotImplemented("TreeReader has no timestamp variant"))
        }

        fn read_symbol(&self) -> Result<Symbol> {
            match &self.current().1 {
                TreeValue::Symbol(s) => Ok(Symbol::from_text(s.clone())),
                _ => Err(IonError::InvalidState("not a symbol")),
            }
        }

        fn read_string(&self) -> Result<String> {
            match &self.current().1 {
                TreeValue::String(s) => Ok(s.clone()),
                _ => Err(IonError::InvalidState("not a string")),
            }
        }

        fn read_blob(&self) -> Result<Vec<u8>> {
            Err(IonError::NotImplemented("TreeReader has no blob variant"))
        }

        fn read_clob(&self) -> Result<Vec<u8>> {
            Err(IonError::NotImplemented("TreeReader has no clob variant"))
        }
    }
}
