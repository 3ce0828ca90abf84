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

//! The local-symbol-table interception state machine: when the user starts
//! a struct annotated `$ion_symbol_table` at depth 0, the writer stops
//! emitting literal values and instead drives this tracker to build a new
//! local table.

use crate::error::{IonError, Result};
use crate::symbol::ImportDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    InLstStruct,
    Imports,
    InImportsList,
    InImportsStruct,
    ImportName,
    ImportVersion,
    ImportMaxId,
    Symbols,
    InSymbolsList,
}

#[derive(Debug, Default)]
struct PendingImport {
    name: Option<String>,
    version: Option<u32>,
    max_id: Option<u32>,
    seen_name: bool,
    seen_version: bool,
    seen_max_id: bool,
}

/// The accumulated result of intercepting one `$ion_symbol_table::{...}`
/// struct.
#[derive(Debug, Default)]
pub struct PendingLst {
    pub imports: Vec<ImportDescriptor>,
    pub symbols: Vec<Option<String>>,
    pub append: bool,
}

/// Drives the struct-field-value event stream of one intercepted struct
/// through the state machine described in the writer facade's design.
pub struct LstInterceptor {
    stack: Vec<State>,
    pending: PendingLst,
    current_import: PendingImport,
    seen_imports_field: bool,
    seen_symbols_field: bool,
    next_field: Option<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Imports,
    Symbols,
    ImportName,
    ImportVersion,
    ImportMaxId,
    Other,
}

impl LstInterceptor {
    pub fn new() -> LstInterceptor {
        LstInterceptor {
            stack: vec![State::InLstStruct],
            pending: PendingLst::default(),
            current_import: PendingImport::default(),
            seen_imports_field: false,
            seen_symbols_field: false,
            next_field: None,
        }
    }

    fn top(&self) -> State {
        *self.stack.last().expect("non-empty interception stack")
    }

    /// True while positioned directly inside the `symbols` list, where any
    /// non-string element must still reserve a slot.
    pub fn in_symbols_list(&self) -> bool {
        self.top() == State::InSymbolsList
    }

    /// A field name was written at the current depth.
    pub fn on_field_name(&mut self, text: &str) -> Result<()> {
        match self.top() {
            State::InLstStruct => {
                self.next_field = Some(match text {
                    "imports" => {
                        if self.seen_imports_field {
                            return Err(IonError::InvalidSymbolTable("duplicate imports field"));
                        }
                        self.seen_imports_field = true;
                        Field::Imports
                    },
                    "symbols" => {
                        if self.seen_symbols_field {
                            return Err(IonError::InvalidSymbolTable("duplicate symbols field"));
                        }
                        self.seen_symbols_field = true;
                        Field::Symbols
                    },
                    _ => Field::Other,
                });
            },
            State::InImportsStruct => {
                self.next_field = Some(match text {
                    "name" => {
                        if self.current_import.seen_name {
                            return Err(IonError::InvalidSymbolTable("duplicate name field in import"));
                        }
                        self.current_import.seen_name = true;
                        Field::ImportName
                    },
                    "version" => {
                        if self.current_import.seen_version {
                            return Err(IonError::InvalidSymbolTable("duplicate version field in import"));
                        }
                        self.current_import.seen_version = true;
                        Field::ImportVersion
                    },
                    "max_id" => {
                        if self.current_import.seen_max_id {
                            return Err(IonError::InvalidSymbolTable("duplicate max_id field in import"));
                        }
                        self.current_import.seen_max_id = true;
                        Field::ImportMaxId
                    },
                    _ => Field::Other,
                });
            },
            _ => {
                // Field names elsewhere (e.g. inside open content) are
                // tracked only so the matching value can be discarded.
                self.next_field = Some(Field::Other);
            },
        }
        Ok(())
    }

    /// The symbol `$ion_symbol_table` was written as a scalar value (used
    /// for both the special "append" marker on `imports` and ordinary
    /// open-content symbols, which are discarded).
    pub fn on_symbol_value(&mut self, text: &str) -> Result<()> {
        if self.top() == State::InLstStruct && self.next_field == Some(Field::Imports) && text == "$ion_symbol_table"
        {
            self.pending.append = true;
            self.next_field = None;
            return Ok(());
        }
        if self.top() == State::InSymbolsList {
            // a bare symbol in the symbols list is a non-string slot: its
            // position is reserved but its text is not recorded.
            self.pending.symbols.push(None);
        }
        Ok(())
    }

    pub fn on_string_value(&mut self, text: &str) -> Result<()> {
        match (self.top(), self.next_field) {
            (State::InSymbolsList, _) => self.pending.symbols.push(Some(text.to_string())),
            (State::InImportsStruct, Some(Field::ImportName)) => {
                self.current_import.name = Some(text.to_string());
                self.next_field = None;
            },
            _ => {},
        }
        Ok(())
    }

    /// Any non-string value inside the `symbols` list is recorded as an
    /// unknown-text slot rather than dropped, preserving SID positions.
    pub fn on_non_string_in_symbols_list(&mut self) {
        if self.top() == State::InSymbolsList {
            self.pending.symbols.push(None);
        }
    }

    pub fn on_int_value(&mut self, value: i64) -> Result<()> {
        match (self.top(), self.next_field) {
            (State::InImportsStruct, Some(Field::ImportVersion)) => {
                self.current_import.version = Some(value.max(1) as u32);
                self.next_field = None;
            },
            (State::InImportsStruct, Some(Field::ImportMaxId)) => {
                self.current_import.max_id = Some(value.max(0) as u32);
                self.next_field = None;
            },
            _ => {},
        }
        Ok(())
    }

    pub fn on_start_container(&mut self) -> Result<()> {
        let next = match (self.top(), self.next_field) {
            (State::InLstStruct, Some(Field::Imports)) => State::InImportsList,
            (State::InLstStruct, Some(Field::Symbols)) => State::InSymbolsList,
            (State::InImportsList, _) => State::InImportsStruct,
            _ => {
                self.stack.push(State::InLstStruct); // open content container: ignore its shape.
                return Ok(());
            },
        };
        self.next_field = None;
        if next == State::InImportsList {
            self.stack.push(State::Imports);
            self.stack.push(State::InImportsList);
        } else if next == State::InSymbolsList {
            self.stack.push(State::Symbols);
            self.stack.push(State::InSymbolsList);
        } else {
            self.current_import = PendingImport::default();
            self.stack.push(State::InImportsStruct);
        }
        Ok(())
    }

    /// Returns `true` once this call closes the outermost intercepted
    /// struct (the caller should then install `take_pending()`).
    pub fn on_finish_container(&mut self) -> Result<bool> {
        let closed = self.stack.pop().ok_or(IonError::InvalidState("interception stack underflow"))?;
        if closed == State::InImportsStruct {
            if let Some(name) = self.current_import.name.take() {
                if name != "$ion" {
                    self.pending.imports.push(ImportDescriptor::new(
                        name,
                        self.current_import.version.unwrap_or(1),
                        self.current_import.max_id,
                    ));
                }
            }
            // an import with no name is ignored entirely.
        }
        Ok(self.stack.is_empty())
    }

    /// Consumes the finished LST contents. Only meaningful once
    /// `on_finish_container` has returned `true`.
    pub fn take_pending(self) -> PendingLst {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_symbols_list_in_declaration_order() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("symbols").unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_string_value("sym1").unwrap();
        fsm.on_string_value("sym2").unwrap();
        let closed = fsm.on_finish_container().unwrap();
        assert!(!closed); // only the inner list closed, not the LST struct itself.
        let closed_outer = fsm.on_finish_container().unwrap();
        assert!(closed_outer);
        let pending = fsm.take_pending();
        assert_eq!(
            pending.symbols,
            vec![Some("sym1".to_string()), Some("sym2".to_string())]
        );
    }

    #[test]
    fn resolves_one_import_with_all_subfields() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        fsm.on_start_container().unwrap(); // imports list
        fsm.on_start_container().unwrap(); // one import struct
        fsm.on_field_name("name").unwrap();
        fsm.on_string_value("foo").unwrap();
        fsm.on_field_name("version").unwrap();
        fsm.on_int_value(2).unwrap();
        fsm.on_field_name("max_id").unwrap();
        fsm.on_int_value(5).unwrap();
        fsm.on_finish_container().unwrap(); // import struct
        fsm.on_finish_container().unwrap(); // imports list
        let closed = fsm.on_finish_container().unwrap();
        assert!(closed);
        let pending = fsm.take_pending();
        assert_eq!(pending.imports.len(), 1);
        assert_eq!(pending.imports[0].name, "foo");
        assert_eq!(pending.imports[0].version, 2);
        assert_eq!(pending.imports[0].declared_max_id, Some(5));
    }

    #[test]
    fn append_marker_on_imports_sets_append_flag() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        fsm.on_symbol_value("$ion_symbol_table").unwrap();
        fsm.on_field_name("symbols").unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_string_value("sym3").unwrap();
        fsm.on_finish_container().unwrap();
        let closed = fsm.on_finish_container().unwrap();
        assert!(closed);
        let pending = fsm.take_pending();
        assert!(pending.append);
    }

    #[test]
    fn duplicate_imports_field_is_an_error() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        assert!(fsm.on_field_name("imports").is_err());
    }

    #[test]
    fn duplicate_name_field_inside_one_import_is_an_error() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_field_name("name").unwrap();
        fsm.on_string_value("foo").unwrap();
        assert!(fsm.on_field_name("name").is_err());
    }

    #[test]
    fn duplicate_max_id_field_inside_one_import_is_an_error() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_field_name("max_id").unwrap();
        fsm.on_int_value(3).unwrap();
        assert!(fsm.on_field_name("max_id").is_err());
    }

    #[test]
    fn import_with_no_name_is_ignored() {
        let mut fsm = LstInterceptor::new();
        fsm.on_field_name("imports").unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_start_container().unwrap();
        fsm.on_field_name("version").unwrap();
        fsm.on_int_value(1).unwrap();
        fsm.on_finish_container().unwrap();
        fsm.on_finish_container().unwrap();
        let closed = fsm.on_finish_container().unwrap();
        assert!(closed);
        assert!(fsm.take_pending().imports.is_empty());
    }
}
