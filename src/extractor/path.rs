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

//! Path construction: a sequence of field/ordinal/wildcard components with a
//! callback invoked when a document value matches the full sequence.

use std::cell::RefCell;

use num_traits::cast::ToPrimitive;

use crate::error::{IonError, Result};
use crate::reader::{IonType, Reader};

/// What a path's callback may instruct the matcher to do after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Continue matching normally.
    Next,
    /// Finish the current value, then step out of `k` containers before
    /// continuing. `k` must be between 1 and the callback's firing depth.
    StepOut(usize),
}

/// One component of a path: matched against a field name, a sibling
/// ordinal, or unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    Field(String),
    Ordinal(i64),
    Wildcard,
}

type Callback = Box<dyn FnMut(&mut dyn Reader, &Path, &mut Control) -> Result<()>>;

/// A sequence of components plus the callback to invoke when the full
/// sequence matches a document value.
pub struct Path {
    pub(crate) components: Vec<PathComponent>,
    pub(crate) is_terminal: Vec<bool>,
    pub(crate) declared_length: usize,
    callback: RefCell<Callback>,
    id: usize,
}

impl Path {
    fn new(components: Vec<PathComponent>, declared_length: usize, callback: Callback) -> Path {
        let is_terminal = (0..components.len()).map(|i| i + 1 == components.len()).collect();
        Path {
            components,
            is_terminal,
            declared_length,
            callback: RefCell::new(callback),
            id: 0,
        }
    }

    /// True once this path has exactly as many components as it declared;
    /// an extractor refuses to match while any registered path is short of
    /// this.
    pub fn is_complete(&self) -> bool {
        self.components.len() == self.declared_length
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// This path's assigned id within its extractor; fires are reported in
    /// ascending id order.
    pub fn id(&self) -> usize {
        self.id
    }

    /// True for a zero-length path: it matches every top-level value.
    pub fn is_depth_zero(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn invoke(&self, reader: &mut dyn Reader, control: &mut Control) -> Result<()> {
        let mut callback = self.callback.borrow_mut();
        (callback)(reader, self, control)
    }
}

/// Builds a [`Path`] fluently, enforcing its declared maximum length as
/// components are appended.
pub struct PathBuilder {
    max_length: usize,
    components: Vec<PathComponent>,
    callback: Callback,
}

impl PathBuilder {
    pub fn new(
        max_length: usize,
        callback: impl FnMut(&mut dyn Reader, &Path, &mut Control) -> Result<()> + 'static,
    ) -> PathBuilder {
        PathBuilder {
            max_length,
            components: Vec::new(),
            callback: Box::new(callback),
        }
    }

    fn check_capacity(&self) -> Result<()> {
        if self.components.len() >= self.max_length {
            Err(IonError::InvalidArg("path cannot be extended beyond its declared length"))
        } else {
            Ok(())
        }
    }

    pub fn append_field(mut self, text: impl Into<String>) -> Result<PathBuilder> {
        self.check_capacity()?;
        self.components.push(PathComponent::Field(text.into()));
        Ok(self)
    }

    pub fn append_ordinal(mut self, index: i64) -> Result<PathBuilder> {
        self.check_capacity()?;
        self.components.push(PathComponent::Ordinal(index));
        Ok(self)
    }

    pub fn append_wildcard(mut self) -> Result<PathBuilder> {
        self.check_capacity()?;
        self.components.push(PathComponent::Wildcard);
        Ok(self)
    }

    /// Finalizes the path. Matching over an extractor cannot begin while any
    /// registered path is still short of its declared length; that check
    /// happens when the path is added to the extractor, not here, since a
    /// zero-length path (which matches every top-level value) is already
    /// complete by construction.
    pub fn build(self) -> Path {
        Path::new(self.components, self.max_length, self.callback)
    }

    /// Declared maximum length, exposed so the extractor can check
    /// completeness before matching begins.
    pub fn declared_length(&self) -> usize {
        self.max_length
    }
}

/// Parses a path from a sexp or list the reader is positioned on: integers
/// become ordinals, strings/symbols become fields, a bare `*` symbol
/// becomes a wildcard unless annotated `$ion_extractor_field`, in which case
/// it is a literal field named `*`.
pub fn path_from_reader(
    reader: &mut dyn Reader,
    max_length: usize,
    callback: impl FnMut(&mut dyn Reader, &Path, &mut Control) -> Result<()> + 'static,
) -> Result<Path> {
    reader.step_in()?;
    let mut components = Vec::new();
    while let Some(ty) = reader.next()? {
        if components.len() >= max_length {
            return Err(IonError::InvalidArg("path cannot be extended beyond its declared length"));
        }
        let literal_field = reader
            .annotation_symbols()
            .iter()
            .any(|a| a.text() == Some("$ion_extractor_field"));
        let component = match ty {
            IonType::Int => {
                let value = reader
                    .read_int()?
                    .to_i64()
                    .ok_or(IonError::NumericOverflow("path ordinal does not fit in i64"))?;
                PathComponent::Ordinal(value)
            },
            IonType::String => PathComponent::Field(reader.read_string()?),
            IonType::Symbol => {
                let symbol = reader.read_symbol()?;
                let text = symbol
                    .text()
                    .ok_or(IonError::InvalidSymbol("path component symbol has unknown text"))?
                    .to_string();
                if text == "*" && !literal_field {
                    PathComponent::Wildcard
                } else {
                    PathComponent::Field(text)
                }
            },
            _ => return Err(IonError::InvalidArg("path component must be an int, string, or symbol")),
        };
        components.push(component);
    }
    reader.step_out()?;
    let length = components.len();
    Ok(Path::new(components, length, Box::new(callback)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_components_past_declared_length() {
        let builder = PathBuilder::new(1, |_, _, _| Ok(()));
        let builder = builder.append_field("a").unwrap();
        assert!(builder.append_field("b").is_err());
    }

    #[test]
    fn zero_length_path_has_no_components_and_is_depth_zero() {
        let path = PathBuilder::new(0, |_, _, _| Ok(())).build();
        assert!(path.is_depth_zero());
        assert!(path.is_terminal.is_empty());
    }

    #[test]
    fn last_component_only_is_marked_terminal() {
        let path = PathBuilder::new(2, |_, _, _| Ok(()))
            .append_field("a")
            .unwrap()
            .append_wildcard()
            .unwrap()
            .build();
        assert_eq!(path.is_terminal, vec![false, true]);
    }
}
