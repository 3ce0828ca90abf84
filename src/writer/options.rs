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

//! Fluent builder for the writer's recognised option set.

use crate::decimal::DecimalContext;
use crate::symbol::{Catalog, ImportDescriptor};

/// Options controlling a [`Writer`](super::writer::Writer)'s output shape.
///
/// Built fluently, mirroring the options builders used elsewhere in the
/// crate family: each setter consumes and returns `Self` so options read
/// as one expression.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub(crate) output_as_binary: bool,
    pub(crate) pretty_print: bool,
    pub(crate) escape_all_non_ascii: bool,
    pub(crate) indent_size: usize,
    pub(crate) max_annotation_count: usize,
    pub(crate) max_container_depth: usize,
    pub(crate) allocation_page_size: usize,
    pub(crate) temp_buffer_size: usize,
    pub(crate) flush_every_value: bool,
    pub(crate) compact_floats: bool,
    pub(crate) json_downconvert: bool,
    pub(crate) imports: Vec<ImportDescriptor>,
    pub(crate) pcatalog: Option<Catalog>,
    pub(crate) decimal_context: Option<DecimalContext>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterOptions {
    /// Options for a binary writer with none of the imports pre-declared.
    ///
    /// # Examples
    ///
    /// ```
    /// use ion_core::writer::WriterOptions;
    ///
    /// let options = WriterOptions::new();
    /// assert!(!options.is_text());
    /// ```
    pub fn new() -> WriterOptions {
        WriterOptions {
            output_as_binary: true,
            pretty_print: false,
            escape_all_non_ascii: false,
            indent_size: 2,
            max_annotation_count: 10,
            max_container_depth: 256,
            allocation_page_size: 4096,
            temp_buffer_size: 1024,
            flush_every_value: false,
            compact_floats: false,
            json_downconvert: false,
            imports: Vec::new(),
            pcatalog: None,
            decimal_context: None,
        }
    }

    /// Switches the writer to the text encoding.
    pub fn text(mut self) -> Self {
        self.output_as_binary = false;
        self
    }

    /// Switches the writer to the binary encoding (the default).
    pub fn binary(mut self) -> Self {
        self.output_as_binary = true;
        self
    }

    /// Enables pretty-printed text output (newlines and indentation). Has
    /// no effect on a binary writer.
    pub fn pretty_print(mut self, flag: bool) -> Self {
        self.pretty_print = flag;
        self
    }

    /// Escapes every non-ASCII byte in text string/symbol literals, rather
    /// than emitting UTF-8 directly.
    pub fn escape_all_non_ascii(mut self, flag: bool) -> Self {
        self.escape_all_non_ascii = flag;
        self
    }

    /// Spaces per indentation level in pretty-printed text. Default 2.
    pub fn indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    /// Maximum number of pending annotations on one value. Default 10.
    pub fn max_annotation_count(mut self, n: usize) -> Self {
        self.max_annotation_count = n;
        self
    }

    /// Maximum container nesting depth. Default 256.
    pub fn max_container_depth(mut self, n: usize) -> Self {
        self.max_container_depth = n;
        self
    }

    /// Forces a flush after every top-level value is completed.
    pub fn flush_every_value(mut self, flag: bool) -> Self {
        self.flush_every_value = flag;
        self
    }

    /// Uses 32-bit floats in binary output whenever the value round-trips
    /// through an `f32` without loss.
    pub fn compact_floats(mut self, flag: bool) -> Self {
        self.compact_floats = flag;
        self
    }

    /// Declares a shared-table import to resolve the writer's local symbol
    /// table against, in addition to the system table.
    pub fn with_import(mut self, import: ImportDescriptor) -> Self {
        self.imports.push(import);
        self
    }

    /// Pre-sized byte count for the writer's internal owner-pool chunks
    /// (field-name/annotation copies). Default 4096.
    pub fn allocation_page_size(mut self, bytes: usize) -> Self {
        self.allocation_page_size = bytes;
        self
    }

    /// Pre-sized byte count for the binary encoder's scratch buffer.
    /// Default 1024.
    pub fn temp_buffer_size(mut self, bytes: usize) -> Self {
        self.temp_buffer_size = bytes;
        self
    }

    /// Down-converts text output to the JSON subset: annotations are
    /// dropped, symbols/timestamps/blobs/clobs are quoted like strings,
    /// sexps use list brackets, and typed nulls collapse to a bare `null`.
    /// Has no effect on a binary writer.
    pub fn json_downconvert(mut self, flag: bool) -> Self {
        self.json_downconvert = flag;
        self
    }

    /// The catalog to resolve this writer's imports against, in place of an
    /// explicit catalog passed to [`Writer::with_catalog`](super::writer::Writer::with_catalog).
    pub fn pcatalog(mut self, catalog: Catalog) -> Self {
        self.pcatalog = Some(catalog);
        self
    }

    /// Precision/rounding context for decimal values. Stored for a future
    /// arithmetic layer; construction and validation, the only decimal
    /// operations this crate performs, don't consult it.
    pub fn decimal_context(mut self, context: DecimalContext) -> Self {
        self.decimal_context = Some(context);
        self
    }

    /// True if this writer will emit text rather than binary.
    pub fn is_text(&self) -> bool {
        !self.output_as_binary
    }
}
