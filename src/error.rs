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

//! Error declarations shared by every subsystem in this crate.

use std::fmt::{Display, Formatter};

use crate::impl_err_conversion;

/// The flat error taxonomy used by the symbol table, writer, and extractor.
///
/// Every fallible operation in this crate returns `Result<T, IonError>`. No
/// operation logs or swallows an error internally; it is always returned to
/// the caller.
#[derive(Debug)]
pub enum IonError {
    /// An argument passed to an operation was invalid on its face (e.g. a
    /// negative length where none is allowed).
    InvalidArg(&'static str),

    /// The receiving object is not in a state that permits the requested
    /// operation (e.g. flushing while a lob is open).
    InvalidState(&'static str),

    /// A symbol could not be resolved: an out-of-range SID, a zero SID used
    /// where text is mandatory, or an unresolved import location.
    InvalidSymbol(&'static str),

    /// A manually-constructed symbol-table struct was malformed (duplicate
    /// `symbols`/`imports` sub-fields, nested symbol tables, etc).
    InvalidSymbolTable(&'static str),

    /// A timestamp's fields were out of range or inconsistent with its
    /// declared precision.
    InvalidTimestamp(&'static str),

    /// Backing allocation failed.
    NoMemory,

    /// The input was exhausted where more data was expected.
    Eof,

    /// The input ended in the middle of a value, a container, or a lob.
    UnexpectedEof(&'static str),

    /// The underlying output sink returned an error.
    Write(std::io::Error),

    /// A numeric value did not fit in its target representation.
    NumericOverflow(&'static str),

    /// The pending annotation list exceeded `max_annotation_count`.
    TooManyAnnotations(usize),

    /// The requested operation is recognized but not implemented.
    NotImplemented(&'static str),
}

impl_err_conversion!(IonError {
    std::io::Error => Write
});

impl Display for IonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IonError::InvalidArg(msg) => write!(f, "invalid argument: {}", msg),
            IonError::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            IonError::InvalidSymbol(msg) => write!(f, "invalid symbol: {}", msg),
            IonError::InvalidSymbolTable(msg) => write!(f, "invalid symbol table: {}", msg),
            IonError::InvalidTimestamp(msg) => write!(f, "invalid timestamp: {}", msg),
            IonError::NoMemory => f.write_str("allocation failure"),
            IonError::Eof => f.write_str("end of stream"),
            IonError::UnexpectedEof(ctx) => write!(f, "unexpected end of stream: {}", ctx),
            IonError::Write(e) => write!(f, "write error: {}", e),
            IonError::NumericOverflow(msg) => write!(f, "numeric overflow: {}", msg),
            IonError::TooManyAnnotations(n) => {
                write!(f, "too many annotations ({} pending)", n)
            },
            IonError::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
        }
    }
}

impl std::error::Error for IonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IonError::Write(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IonError>;
