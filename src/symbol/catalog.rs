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

//! The catalog: a local registry of shared symbol tables a reader or
//! writer consults to resolve imports by name and version.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::table::SharedTable;

/// A registry of shared symbol tables, keyed by name and then by version.
///
/// Resolution prefers an exact version match; failing that, it falls back
/// to the highest version registered under that name, mirroring the "best
/// effort" import resolution a reader performs when it cannot find the
/// exact version a stream's LST requested.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    tables: HashMap<String, BTreeMap<u32, Arc<SharedTable>>>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Catalog {
        Catalog {
            tables: HashMap::new(),
        }
    }

    /// Registers a shared table, replacing any previously registered table
    /// with the same name and version.
    pub fn add(&mut self, table: SharedTable) {
        self.tables
            .entry(table.name().to_string())
            .or_default()
            .insert(table.version(), Arc::new(table));
    }

    /// Removes a specific name/version entry, returning it if present.
    pub fn remove(&mut self, name: &str, version: u32) -> Option<Arc<SharedTable>> {
        let versions = self.tables.get_mut(name)?;
        let removed = versions.remove(&version);
        if versions.is_empty() {
            self.tables.remove(name);
        }
        removed
    }

    /// Finds the best match for `name`/`version`: an exact version match if
    /// registered, otherwise the highest registered version, otherwise
    /// `None` if the name is not registered at all.
    pub fn find_best_match(&self, name: &str, version: u32) -> Option<Arc<SharedTable>> {
        let versions = self.tables.get(name)?;
        versions
            .get(&version)
            .or_else(|| versions.values().next_back())
            .cloned()
    }

    /// All versions registered for a given name, in ascending order.
    pub fn versions_of(&self, name: &str) -> Vec<u32> {
        self.tables
            .get(name)
            .map(|v| v.keys().copied().collect())
            .unwrap_or_default()
    }
}
