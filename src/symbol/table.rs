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

//! Shared and local symbol tables.

use std::sync::Arc;

use super::catalog::Catalog;
use super::system::system_table;
use crate::error::{IonError, Result};

/// Where a SID resolved to, for [`SymbolTable::find_by_sid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidLookup<'a> {
    /// The SID maps to known text.
    Text(&'a str),
    /// The SID is a valid slot but its text could not be resolved (an
    /// unresolved import, or a null slot in a loaded shared table).
    Unknown,
}

/// A named, versioned, immutable table of symbol texts.
///
/// Slots may be `None`, meaning "unknown text at this SID" -- this happens
/// when a shared table is loaded from a struct whose `symbols` list contains
/// a non-string element, per the LST interception rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedTable {
    name: String,
    version: u32,
    symbols: Vec<Option<String>>,
}

impl SharedTable {
    /// Builds a shared table directly from a list of optional texts (`None`
    /// slots are unknown-text).
    pub fn from_texts(
        name: impl Into<String>,
        version: u32,
        symbols: impl IntoIterator<Item = Option<String>>,
    ) -> SharedTable {
        SharedTable {
            name: name.into(),
            version,
            symbols: symbols.into_iter().collect(),
        }
    }

    /// The table's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's version (>= 1).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The table's declared length (highest SID it defines).
    pub fn max_id(&self) -> u32 {
        self.symbols.len() as u32
    }

    /// Returns the text at the given 1-based SID within this table, or
    /// `None` if the SID is out of range or its slot is unknown.
    pub fn text(&self, sid: u32) -> Option<&str> {
        if sid == 0 {
            return None;
        }
        self.symbols
            .get((sid - 1) as usize)
            .and_then(|s| s.as_deref())
    }

    /// The lowest SID within this table whose text equals `name`, if any.
    pub fn find_by_name(&self, name: &str) -> Option<u32> {
        self.symbols
            .iter()
            .position(|s| s.as_deref() == Some(name))
            .map(|i| i as u32 + 1)
    }

    /// Returns a view of this table extended (or truncated) to exactly
    /// `max_id` slots, padding with unknown-text slots as needed -- used
    /// when an import declares a `max_id` different from the resolved
    /// table's actual length.
    pub fn resized_to(&self, max_id: u32) -> SharedTable {
        let mut symbols = self.symbols.clone();
        symbols.resize(max_id as usize, None);
        SharedTable {
            name: self.name.clone(),
            version: self.version,
            symbols,
        }
    }
}

/// One resolved entry in a local table's import list.
#[derive(Debug, Clone)]
pub struct ImportDescriptor {
    /// Name of the shared table to import.
    pub name: String,
    /// Version to request (defaults to 1 if the caller has no preference).
    pub version: u32,
    /// Declared length of the imported SID block. When `None`, the length
    /// is whatever the catalog-resolved table's `max_id` happens to be.
    pub declared_max_id: Option<u32>,
}

impl ImportDescriptor {
    /// A declaration with an explicit version and max_id.
    pub fn new(name: impl Into<String>, version: u32, declared_max_id: Option<u32>) -> Self {
        ImportDescriptor {
            name: name.into(),
            version,
            declared_max_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedImport {
    name: String,
    resolved: Option<Arc<SharedTable>>,
    sid_offset: u32,
    length: u32,
}

/// A writer/reader's currently active, mutable local symbol table.
///
/// SID assignment: the system range `1..=9` is implicit, then each import
/// occupies a contiguous block of `length` SIDs in declaration order
/// (regardless of whether it resolved against the catalog), then locally
/// added texts follow.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTable {
    imports: Vec<ResolvedImport>,
    locals: Vec<String>,
    locked: bool,
}

impl LocalTable {
    /// Opens a fresh local table, resolving each import against `catalog`.
    pub fn open(imports: Vec<ImportDescriptor>, catalog: &Catalog) -> LocalTable {
        let mut resolved = Vec::with_capacity(imports.len());
        let mut next_sid = system_table().max_id() + 1;
        for descriptor in imports {
            let best = catalog.find_best_match(&descriptor.name, descriptor.version);
            let length = descriptor
                .declared_max_id
                .unwrap_or_else(|| best.as_ref().map(|t| t.max_id()).unwrap_or(0));
            resolved.push(ResolvedImport {
                name: descriptor.name,
                resolved: best,
                sid_offset: next_sid,
                length,
            });
            next_sid += length;
        }
        LocalTable {
            imports: resolved,
            locals: Vec::new(),
            locked: false,
        }
    }

    /// Opens a local table that appends to a previous context: the
    /// previous table's imports and locals are inherited verbatim and new
    /// locals are added on top, per the "imports: $ion_symbol_table" append
    /// special case.
    pub fn append_from(previous: &LocalTable) -> LocalTable {
        LocalTable {
            imports: previous
                .imports
                .iter()
                .map(|i| ResolvedImport {
                    name: i.name.clone(),
                    resolved: i.resolved.clone(),
                    sid_offset: i.sid_offset,
                    length: i.length,
                })
                .collect(),
            locals: previous.locals.clone(),
            locked: false,
        }
    }

    fn first_local_sid(&self) -> u32 {
        self.imports
            .last()
            .map(|i| i.sid_offset + i.length)
            .unwrap_or(system_table().max_id() + 1)
    }

    /// Adds a symbol, returning its (possibly pre-existing, possibly new)
    /// SID. Idempotent on text.
    pub fn add_symbol(&mut self, text: &str) -> Result<u32> {
        if self.locked {
            return Err(IonError::InvalidSymbolTable("table is locked"));
        }
        if let Some(sid) = self.find_by_name(text) {
            return Ok(sid);
        }
        self.locals.push(text.to_string());
        Ok(self.first_local_sid() + self.locals.len() as u32 - 1)
    }

    /// Looks up the lowest SID whose text equals `text`, searching the
    /// system range, then imports in declaration order, then locals.
    pub fn find_by_name(&self, text: &str) -> Option<u32> {
        if let Some(sid) = system_table().find_by_name(text) {
            return Some(sid);
        }
        for import in &self.imports {
            if let Some(table) = &import.resolved {
                if let Some(local_sid) = table.find_by_name(text) {
                    if local_sid <= import.length {
                        return Some(import.sid_offset + local_sid - 1);
                    }
                }
            }
        }
        self.locals
            .iter()
            .position(|s| s == text)
            .map(|i| self.first_local_sid() + i as u32)
    }

    /// Resolves a SID to its text, or reports it as a valid-but-unknown
    /// slot, or `None` if the SID is not defined in this context at all.
    pub fn find_by_sid(&self, sid: u32) -> Option<SidLookup<'_>> {
        if sid == 0 {
            return None;
        }
        if sid <= system_table().max_id() {
            return system_table().text(sid).map(SidLookup::Text);
        }
        for import in &self.imports {
            if sid >= import.sid_offset && sid < import.sid_offset + import.length {
                let local_sid = sid - import.sid_offset + 1;
                return match &import.resolved {
                    Some(table) if local_sid <= table.max_id() => {
                        match table.text(local_sid) {
                            Some(t) => Some(SidLookup::Text(t)),
                            None => Some(SidLookup::Unknown),
                        }
                    },
                    _ => Some(SidLookup::Unknown),
                };
            }
        }
        let first_local = self.first_local_sid();
        if sid >= first_local && sid < first_local + self.locals.len() as u32 {
            let text = &self.locals[(sid - first_local) as usize];
            return Some(SidLookup::Text(text));
        }
        None
    }

    /// The highest SID currently defined in this context.
    pub fn max_sid(&self) -> u32 {
        self.first_local_sid() + self.locals.len() as u32 - 1
    }

    /// True once the table has been frozen (crossed a top-level boundary).
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freezes the table against further additions.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// True if any local symbols have been added on top of the imports.
    pub fn has_local_additions(&self) -> bool {
        !self.locals.is_empty()
    }

    /// The table's import declarations, in order, with their resolved
    /// length -- used by the text/binary encoders to serialize the LST.
    pub fn imports(&self) -> impl Iterator<Item = (&str, u32, u32)> {
        self.imports
            .iter()
            .map(|i| (i.name.as_str(), i.sid_offset, i.length))
    }

    /// The locally-added symbol texts, in order.
    pub fn local_symbols(&self) -> &[String] {
        &self.locals
    }
}

/// The three kinds of symbol table a reader or writer may be working with.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolTable {
    /// The frozen, built-in system table.
    System,
    /// A named, versioned, immutable table intended for reuse via imports.
    Shared(Arc<SharedTable>),
    /// The writer/reader's currently active, mutable local table.
    Local(LocalTable),
}

impl SymbolTable {
    /// Resolves a SID to text using whichever variant this is.
    pub fn find_by_sid(&self, sid: u32) -> Option<SidLookup<'_>> {
        match self {
            SymbolTable::System => system_table().text(sid).map(SidLookup::Text),
            SymbolTable::Shared(t) => t.text(sid).map(SidLookup::Text),
            SymbolTable::Local(t) => t.find_by_sid(sid),
        }
    }

    /// The highest SID defined by this table.
    pub fn max_sid(&self) -> u32 {
        match self {
            SymbolTable::System => system_table().max_id(),
            SymbolTable::Shared(t) => t.max_id(),
            SymbolTable::Local(t) => t.max_sid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_table_with_no_imports_starts_locals_at_ten() {
        let catalog = Catalog::new();
        let mut local = LocalTable::open(Vec::new(), &catalog);
        let sid = local.add_symbol("sym1").unwrap();
        assert_eq!(sid, 10);
    }

    #[test]
    fn add_symbol_is_idempotent_on_text() {
        let catalog = Catalog::new();
        let mut local = LocalTable::open(Vec::new(), &catalog);
        let a = local.add_symbol("sym1").unwrap();
        let b = local.add_symbol("sym1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn import_block_offsets_first_local_symbol() {
        let mut catalog = Catalog::new();
        catalog.add(SharedTable::from_texts(
            "foo",
            1,
            vec![Some("a".into()), Some("b".into()), Some("c".into())],
        ));
        let imports = vec![ImportDescriptor::new("foo", 1, None)];
        let mut local = LocalTable::open(imports, &catalog);
        // system 1..9, import "foo" occupies 10..12 (max_id 3), so locals start at 13.
        let sid = local.add_symbol("sym1").unwrap();
        assert_eq!(sid, 13);
        assert_eq!(local.find_by_name("b"), Some(11));
    }

    #[test]
    fn unresolved_import_still_reserves_its_declared_block() {
        let catalog = Catalog::new();
        let imports = vec![ImportDescriptor::new("missing", 1, Some(5))];
        let mut local = LocalTable::open(imports, &catalog);
        let sid = local.add_symbol("sym1").unwrap();
        assert_eq!(sid, 15); // 9 system + 5 unresolved import + 1
        assert!(matches!(local.find_by_sid(11), Some(SidLookup::Unknown)));
    }

    #[test]
    fn locking_blocks_further_additions() {
        let catalog = Catalog::new();
        let mut local = LocalTable::open(Vec::new(), &catalog);
        local.lock();
        assert!(local.add_symbol("sym1").is_err());
    }

    #[test]
    fn find_by_sid_round_trips_find_by_name() {
        let catalog = Catalog::new();
        let mut local = LocalTable::open(Vec::new(), &catalog);
        let sid = local.add_symbol("sym1").unwrap();
        assert_eq!(local.find_by_sid(sid), Some(SidLookup::Text("sym1")));
    }
}
