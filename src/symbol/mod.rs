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

//! Symbol tables, the system/shared/local hierarchy, and the catalog.

mod catalog;
mod system;
mod table;

pub use catalog::Catalog;
pub use system::system_table;
pub use table::{ImportDescriptor, LocalTable, SharedTable, SidLookup, SymbolTable};

/// SID 0 is reserved and always means "unknown symbol text".
pub const UNKNOWN_SYMBOL_SID: u32 = 0;

/// Where a symbol's text came from when the local table doesn't know it
/// directly but knows it was imported from a named shared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLocation {
    /// Name of the shared table the symbol was imported from.
    pub table_name: String,
    /// The symbol's SID within that shared table.
    pub sid: u32,
}

/// A symbol token: at least one of `text`, `sid`, or `import_location` is
/// `Some`.
///
/// Accessors check variants in priority order text -> import-location -> sid,
/// per the polymorphism design note in the spec: text is authoritative when
/// present, otherwise the import location identifies the symbol across
/// documents, and the raw SID is the last resort (meaningful only within the
/// current table context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    text: Option<String>,
    sid: Option<u32>,
    import_location: Option<ImportLocation>,
}

impl Symbol {
    /// Builds a symbol from known text.
    pub fn from_text(text: impl Into<String>) -> Symbol {
        Symbol {
            text: Some(text.into()),
            sid: None,
            import_location: None,
        }
    }

    /// Builds a symbol from a bare SID with unknown text (meaningful only in
    /// the context of a particular symbol table).
    pub fn from_sid(sid: u32) -> Symbol {
        Symbol {
            text: None,
            sid: Some(sid),
            import_location: None,
        }
    }

    /// Builds a symbol known to have come from a particular shared table,
    /// without (yet) knowing its text.
    pub fn from_import_location(table_name: impl Into<String>, sid: u32) -> Symbol {
        Symbol {
            text: None,
            sid: None,
            import_location: Some(ImportLocation {
                table_name: table_name.into(),
                sid,
            }),
        }
    }

    /// Attaches a SID to a symbol that already carries other information
    /// (e.g. recording the SID a text symbol was assigned by a table).
    pub fn with_sid(mut self, sid: u32) -> Symbol {
        self.sid = Some(sid);
        self
    }

    /// The symbol's text, if known.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The symbol's SID within its current context, if known.
    pub fn sid(&self) -> Option<u32> {
        self.sid
    }

    /// The symbol's import location, if known.
    pub fn import_location(&self) -> Option<&ImportLocation> {
        self.import_location.as_ref()
    }

    /// True if this token carries no usable information at all. Constructing
    /// such a symbol directly is not possible through the public
    /// constructors; this only arises from malformed input and is checked
    /// defensively by readers of untrusted data.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.sid.is_none() && self.import_location.is_none()
    }
}

impl From<&str> for Symbol {
    fn from(v: &str) -> Self {
        Symbol::from_text(v)
    }
}

impl From<String> for Symbol {
    fn from(v: String) -> Self {
        Symbol::from_text(v)
    }
}

impl From<u32> for Symbol {
    fn from(v: u32) -> Self {
        Symbol::from_sid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_symbol_has_no_import_location() {
        let s = Symbol::from_text("abc");
        assert_eq!(s.text(), Some("abc"));
        assert_eq!(s.sid(), None);
        assert!(s.import_location().is_none());
    }

    #[test]
    fn sid_symbol_is_distinguishable_from_text() {
        let s = Symbol::from_sid(42);
        assert_eq!(s.sid(), Some(42));
        assert!(s.text().is_none());
    }
}
