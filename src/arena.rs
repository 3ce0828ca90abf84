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

//! The writer's small-allocation arena ("owner pool").
//!
//! Field-name copies, annotation lists, and LST symbol text all live here
//! instead of being individually heap-allocated. The pool is rotated on
//! `finish` (old allocations are dropped all at once) and released on
//! `close`.

use bumpalo::Bump;

/// A bump-allocated pool of small, short-lived strings.
pub struct OwnerPool {
    bump: Bump,
}

impl Default for OwnerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnerPool {
    /// Creates a new, empty pool.
    pub fn new() -> OwnerPool {
        OwnerPool { bump: Bump::new() }
    }

    /// Creates a new, empty pool with its first chunk pre-sized to
    /// `page_size` bytes, avoiding a reallocation on the first interning
    /// call for callers who already know roughly how much they'll use.
    pub fn with_capacity(page_size: usize) -> OwnerPool {
        OwnerPool {
            bump: Bump::with_capacity(page_size),
        }
    }

    /// Copies `s` into the pool and returns a slice borrowed from the pool.
    pub fn intern(&mut self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Rotates the pool: all previous allocations are released and a fresh
    /// empty pool takes their place.
    pub fn rotate(&mut self) {
        self.bump.reset();
    }

    /// Total bytes currently allocated from the underlying chunks.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_roundtrips_text() {
        let mut pool = OwnerPool::new();
        let a = pool.intern("hello").to_owned();
        let b = pool.intern("world").to_owned();
        assert_eq!(a, "hello");
        assert_eq!(b, "world");
    }

    #[test]
    fn rotate_resets_allocation() {
        let mut pool = OwnerPool::new();
        pool.intern("some reasonably sized string to force a chunk allocation");
        assert!(pool.allocated_bytes() > 0);
        pool.rotate();
        assert_eq!(pool.allocated_bytes(), 0);
    }
}
