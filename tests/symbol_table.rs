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

//! The quantified symbol-table invariants from the spec's testable
//! properties: SID allocation, round-tripping a name through a SID and
//! back, and stability of previously-assigned SIDs across further additions.

use ion_core::symbol::{Catalog, ImportDescriptor, LocalTable, SharedTable, SidLookup};

#[test]
fn first_local_sid_is_ten_plus_sum_of_import_lengths() {
    let mut catalog = Catalog::new();
    catalog.add(SharedTable::from_texts(
        "shared_a",
        1,
        vec![Some("x".to_string()), Some("y".to_string()), Some("z".to_string())],
    ));
    let imports = vec![ImportDescriptor::new("shared_a", 1, None)];
    let mut table = LocalTable::open(imports, &catalog);
    let sid = table.add_symbol("first_local").unwrap();
    // system occupies 1..=9, the import occupies 10..=12 (length 3), so the
    // first local symbol lands at 10 + 3 = 13.
    assert_eq!(sid, 13);
}

#[test]
fn find_by_sid_of_find_by_name_returns_the_original_text() {
    let catalog = Catalog::new();
    let mut table = LocalTable::open(Vec::new(), &catalog);
    table.add_symbol("alpha").unwrap();
    table.add_symbol("beta").unwrap();

    let sid = table.find_by_name("beta").unwrap();
    match table.find_by_sid(sid) {
        Some(SidLookup::Text(text)) => assert_eq!(text, "beta"),
        other => panic!("expected resolvable text, got {:?}", other),
    }
}

#[test]
fn duplicate_symbol_text_resolves_to_the_lowest_sid() {
    let catalog = Catalog::new();
    let mut table = LocalTable::open(Vec::new(), &catalog);
    let first = table.add_symbol("dup").unwrap();
    let second = table.add_symbol("dup").unwrap();
    assert_eq!(first, second);
    assert_eq!(table.find_by_name("dup"), Some(first));
}

#[test]
fn system_symbols_take_priority_over_same_text_in_an_import() {
    let mut catalog = Catalog::new();
    catalog.add(SharedTable::from_texts("shadowing", 1, vec![Some("name".to_string())]));
    let table = LocalTable::open(vec![ImportDescriptor::new("shadowing", 1, None)], &catalog);
    // "name" is system symbol 4; the import's own copy at a higher sid must
    // never win the lookup.
    assert_eq!(table.find_by_name("name"), Some(4));
}

#[test]
fn previously_assigned_sids_survive_further_additions() {
    let catalog = Catalog::new();
    let mut table = LocalTable::open(Vec::new(), &catalog);
    let first = table.add_symbol("first").unwrap();
    table.add_symbol("second").unwrap();
    table.add_symbol("third").unwrap();
    assert_eq!(table.find_by_name("first"), Some(first));
    assert!(matches!(table.find_by_sid(first), Some(SidLookup::Text("first"))));
}

#[test]
fn locked_table_rejects_new_additions() {
    let catalog = Catalog::new();
    let mut table = LocalTable::open(Vec::new(), &catalog);
    table.add_symbol("a").unwrap();
    table.lock();
    assert!(table.add_symbol("b").is_err());
}

#[test]
fn append_from_inherits_imports_and_locals_unlocked() {
    let catalog = Catalog::new();
    let mut base = LocalTable::open(Vec::new(), &catalog);
    base.add_symbol("carried_over").unwrap();
    base.lock();

    let mut appended = LocalTable::append_from(&base);
    assert!(!appended.is_locked());
    assert_eq!(appended.find_by_name("carried_over"), Some(10));
    let new_sid = appended.add_symbol("new_one").unwrap();
    assert_eq!(new_sid, 11);
}
