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

//! The frozen, built-in system symbol table (SIDs 1-9).

use once_cell::sync::Lazy;

use super::table::SharedTable;

/// Well-known system symbol texts, indexed such that `SYSTEM_SYMBOLS[i]`
/// has SID `i + 1`.
pub const SYSTEM_SYMBOLS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

static SYSTEM_TABLE: Lazy<SharedTable> =
    Lazy::new(|| SharedTable::from_texts("$ion", 1, SYSTEM_SYMBOLS.iter().map(|s| Some(s.to_string()))));

/// Returns the shared, frozen system symbol table (SIDs 1..9).
pub fn system_table() -> &'static SharedTable {
    &SYSTEM_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_occupies_one_through_nine() {
        let t = system_table();
        assert_eq!(t.max_id(), 9);
        assert_eq!(t.text(3), Some("$ion_symbol_table"));
        assert_eq!(t.find_by_name("$ion_1_0"), Some(2));
    }
}
