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

//! The writer facade: dispatches between the binary and text encoders behind
//! one concrete type, drives the pending field-name/annotation list, and
//! runs the LST interception state machine.

use std::io::Write;
use std::mem;

use num_bigint::BigInt;

use super::lst::LstInterceptor;
use super::options::WriterOptions;
use crate::arena::OwnerPool;
use crate::binary::{BinaryEncoder, ContainerKind as BinaryContainerKind};
use crate::decimal::Decimal;
use crate::error::{IonError, Result};
use crate::reader::{IonType, Reader};
use crate::symbol::{Catalog, ImportDescriptor, LocalTable};
use crate::text::{ContainerKind as TextContainerKind, TextEncoder};
use crate::timestamp::Timestamp;

/// Which kind of container is being opened, independent of output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Sexp,
    Struct,
}

impl ContainerKind {
    fn to_binary(self) -> BinaryContainerKind {
        match self {
            ContainerKind::List => BinaryContainerKind::List,
            ContainerKind::Sexp => BinaryContainerKind::Sexp,
            ContainerKind::Struct => BinaryContainerKind::Struct,
        }
    }

    fn to_text(self) -> TextContainerKind {
        match self {
            ContainerKind::List => TextContainerKind::List,
            ContainerKind::Sexp => TextContainerKind::Sexp,
            ContainerKind::Struct => TextContainerKind::Struct,
        }
    }

    fn from_ion_type(ty: IonType) -> Option<ContainerKind> {
        match ty {
            IonType::List => Some(ContainerKind::List),
            IonType::Sexp => Some(ContainerKind::Sexp),
            IonType::Struct => Some(ContainerKind::Struct),
            _ => None,
        }
    }
}

enum LobState {
    Blob(Vec<u8>),
    Clob(Vec<u8>),
}

enum Encoding<W: Write> {
    Binary { encoder: BinaryEncoder, out: W },
    Text { encoder: TextEncoder<W> },
}

/// Writes Ion values to `W`, in either binary or text, sharing one event
/// surface and one symbol-table/LST-interception state machine regardless
/// of which encoding is selected.
pub struct Writer<W: Write> {
    encoding: Encoding<W>,
    catalog: Catalog,
    base_imports: Vec<ImportDescriptor>,
    active_table: LocalTable,
    container_stack: Vec<(ContainerKind, bool)>,
    pending_field: Option<String>,
    pending_annotations: Vec<String>,
    max_annotation_count: usize,
    max_container_depth: usize,
    flush_every_value: bool,
    lob: Option<LobState>,
    lst: Option<LstInterceptor>,
    arena: OwnerPool,
    /// How many of `active_table`'s locals have already gone out in a
    /// previous LST-append. Only the tail past this point is new.
    lst_locals_emitted: usize,
}

impl<W: Write> Writer<W> {
    /// Opens a writer with an empty catalog, unless `options` carries its
    /// own `pcatalog`.
    pub fn new(out: W, options: WriterOptions) -> Result<Writer<W>> {
        let catalog = options.pcatalog.clone().unwrap_or_default();
        Self::with_catalog(out, options, catalog)
    }

    /// Opens a writer, resolving its configured imports against `catalog`.
    /// Takes precedence over any `pcatalog` set on `options`.
    pub fn with_catalog(out: W, options: WriterOptions, catalog: Catalog) -> Result<Writer<W>> {
        let base_imports = options.imports.clone();
        let active_table = LocalTable::open(options.imports.clone(), &catalog);
        let encoding = if options.output_as_binary {
            let mut encoder = BinaryEncoder::with_capacity(options.temp_buffer_size);
            encoder.write_ivm()?;
            Encoding::Binary { encoder, out }
        } else {
            Encoding::Text {
                encoder: TextEncoder::new(
                    out,
                    options.pretty_print,
                    options.indent_size,
                    options.escape_all_non_ascii,
                    options.json_downconvert,
                ),
            }
        };
        Ok(Writer {
            encoding,
            catalog,
            base_imports,
            active_table,
            container_stack: Vec::new(),
            pending_field: None,
            pending_annotations: Vec::new(),
            max_annotation_count: options.max_annotation_count,
            max_container_depth: options.max_container_depth,
            flush_every_value: options.flush_every_value,
            lob: None,
            lst: None,
            arena: OwnerPool::with_capacity(options.allocation_page_size),
            lst_locals_emitted: 0,
        })
    }

    /// Current container nesting depth (0 at the top level).
    pub fn depth(&self) -> usize {
        self.container_stack.len()
    }

    /// Copies `text` into an owned, independently-lived `String`.
    ///
    /// A pending field name or annotation must survive from the call that
    /// sets it to the later call that writes the value it belongs to, so it
    /// cannot borrow from `arena`: that would make `Writer` self-referential.
    /// Plain heap allocation is used instead.
    fn stage_text(&mut self, text: &str) -> String {
        text.to_string()
    }

    fn resolve_sid_for_write(&mut self, text: &str) -> Result<u32> {
        if let Some(sid) = self.active_table.find_by_name(text) {
            Ok(sid)
        } else {
            self.active_table.add_symbol(text)
        }
    }

    fn check_struct_field_requirement(&self) -> Result<()> {
        if matches!(self.container_stack.last(), Some((ContainerKind::Struct, _))) && self.pending_field.is_none() {
            Err(IonError::InvalidState("value written inside a struct with no pending field name"))
        } else {
            Ok(())
        }
    }

    fn guard_top_level_state(&self) -> Result<()> {
        if self.depth() != 0 {
            Err(IonError::InvalidState("operation only permitted at depth 0"))
        } else if self.pending_field.is_some() {
            Err(IonError::InvalidState("operation not permitted with a pending field name"))
        } else if !self.pending_annotations.is_empty() {
            Err(IonError::InvalidState("operation not permitted with pending annotations"))
        } else if self.lob.is_some() {
            Err(IonError::InvalidState("operation not permitted with a lob in progress"))
        } else {
            Ok(())
        }
    }

    /// Sets the pending field name for the next value. Only valid directly
    /// inside a struct.
    pub fn write_field_name(&mut self, text: &str) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            lst.on_field_name(text)?;
            return Ok(());
        }
        if !matches!(self.container_stack.last(), Some((ContainerKind::Struct, _))) {
            return Err(IonError::InvalidState("field name written outside a struct"));
        }
        if self.pending_field.is_some() {
            return Err(IonError::InvalidState("duplicate field name for one value"));
        }
        self.pending_field = Some(self.stage_text(text));
        Ok(())
    }

    /// Appends one annotation to the pending list for the next value.
    pub fn add_annotation(&mut self, text: &str) -> Result<()> {
        if self.pending_annotations.len() >= self.max_annotation_count {
            return Err(IonError::TooManyAnnotations(self.pending_annotations.len()));
        }
        let staged = self.stage_text(text);
        self.pending_annotations.push(staged);
        Ok(())
    }

    /// True if the pending annotation list's first entry is exactly
    /// `$ion_symbol_table` (the LST-interception trigger condition).
    fn pending_is_lst_annotation(&self) -> bool {
        self.pending_annotations
            .first()
            .map(|s| s == "$ion_symbol_table")
            .unwrap_or(false)
    }

    /// Consumes the pending field name and annotation list, emitting them
    /// into the active encoder. Returns `true` if a binary annotation
    /// wrapper was opened and must be closed by the caller after the value.
    fn begin_value(&mut self) -> Result<bool> {
        self.check_struct_field_requirement()?;
        let field = self.pending_field.take();
        let annotations = mem::take(&mut self.pending_annotations);

        let field_sid = if matches!(self.encoding, Encoding::Binary { .. }) {
            match &field {
                Some(name) => Some(self.resolve_sid_for_write(name)?),
                None => None,
            }
        } else {
            None
        };
        let annotation_sids = if matches!(self.encoding, Encoding::Binary { .. }) && !annotations.is_empty() {
            let mut sids = Vec::with_capacity(annotations.len());
            for text in &annotations {
                sids.push(self.resolve_sid_for_write(text)?);
            }
            sids
        } else {
            Vec::new()
        };

        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => {
                if let Some(sid) = field_sid {
                    encoder.write_field_sid(sid)?;
                }
                if !annotation_sids.is_empty() {
                    encoder.start_annotation_wrapper(&annotation_sids)?;
                    return Ok(true);
                }
                Ok(false)
            },
            Encoding::Text { encoder } => {
                if let Some(name) = &field {
                    encoder.write_field_name(name)?;
                }
                if !annotations.is_empty() {
                    encoder.write_annotations(&annotations)?;
                }
                Ok(false)
            },
        }
    }

    fn end_value(&mut self, annotation_open: bool) -> Result<()> {
        if annotation_open {
            if let Encoding::Binary { encoder, .. } = &mut self.encoding {
                encoder.finish_annotation_wrapper()?;
            }
        }
        if self.flush_every_value && self.depth() == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Starts intercepting LST construction if `kind` is `Struct`, the
    /// writer is at depth 0, and the pending annotation chain's first entry
    /// is `$ion_symbol_table`; returns `true` if interception began.
    fn maybe_start_interception(&mut self, kind: ContainerKind) -> bool {
        if kind == ContainerKind::Struct && self.depth() == 0 && self.pending_is_lst_annotation() {
            self.pending_annotations.clear();
            self.lst = Some(LstInterceptor::new());
            true
        } else {
            false
        }
    }

    pub fn start_container(&mut self, kind: ContainerKind) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            lst.on_start_container()?;
            return Ok(());
        }
        if self.maybe_start_interception(kind) {
            return Ok(());
        }
        if self.depth() >= self.max_container_depth {
            return Err(IonError::InvalidState("max container depth exceeded"));
        }
        let opened_annotation = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.start_container(kind.to_binary())?,
            Encoding::Text { encoder } => encoder.start_container(kind.to_text())?,
        }
        self.container_stack.push((kind, opened_annotation));
        Ok(())
    }

    pub fn finish_container(&mut self) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            let closed_outermost = lst.on_finish_container()?;
            if closed_outermost {
                let interceptor = self.lst.take().expect("lst set");
                let pending = interceptor.take_pending();
                let mut next_table = if pending.append {
                    LocalTable::append_from(&self.active_table)
                } else {
                    LocalTable::open(pending.imports, &self.catalog)
                };
                for (index, slot) in pending.symbols.iter().enumerate() {
                    match slot {
                        Some(text) => {
                            next_table.add_symbol(text)?;
                        },
                        None => {
                            // an unknown-text slot still reserves a SID; `add_symbol` is
                            // idempotent on text, so a unique placeholder per index keeps
                            // distinct unknown slots from collapsing onto one SID.
                            next_table.add_symbol(&format!("$__unknown_symbol_{}", index))?;
                        },
                    }
                }
                self.active_table = next_table;
                // Every local just installed is already accounted for: either
                // it was copied from a table that was already emitted, or the
                // user just wrote it themselves as the literal struct bytes
                // above. Only symbols added after this point need a future
                // auto-generated append.
                self.lst_locals_emitted = self.active_table.local_symbols().len();
            }
            return Ok(());
        }
        let (_, annotated) = self
            .container_stack
            .pop()
            .ok_or(IonError::InvalidState("no open container to finish"))?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => {
                encoder.finish_container()?;
                if annotated {
                    encoder.finish_annotation_wrapper()?;
                }
            },
            Encoding::Text { encoder } => encoder.finish_container()?,
        }
        if self.flush_every_value && self.depth() == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn write_typed_null(&mut self, ty: IonType) -> Result<()> {
        if self.lst.is_some() {
            return Ok(()); // open content inside an intercepted struct.
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_null(ty)?,
            Encoding::Text { encoder } => encoder.write_null(ty)?,
        }
        self.end_value(opened)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        if self.lst.is_some() {
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_bool(value)?,
            Encoding::Text { encoder } => encoder.write_bool(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_int(&mut self, value: &BigInt) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if let Some(i64_value) = i64_from_bigint(value) {
                lst.on_int_value(i64_value)?;
            } else if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_int(value)?,
            Encoding::Text { encoder } => encoder.write_int(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_float(&mut self, value: f64, compact: bool) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_float(value, compact)?,
            Encoding::Text { encoder } => encoder.write_float(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_decimal(value)?,
            Encoding::Text { encoder } => encoder.write_decimal(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_timestamp(value)?,
            Encoding::Text { encoder } => encoder.write_timestamp(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            lst.on_string_value(value)?;
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_string(value)?,
            Encoding::Text { encoder } => encoder.write_string(value)?,
        }
        self.end_value(opened)
    }

    pub fn write_symbol(&mut self, text: &str) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            lst.on_symbol_value(text)?;
            return Ok(());
        }
        let is_binary = matches!(self.encoding, Encoding::Binary { .. });
        let ivm_elision_eligible = self.depth() == 0 && self.pending_annotations.is_empty();
        let sid = if is_binary { Some(self.resolve_sid_for_write(text)?) } else { None };
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => {
                encoder.write_symbol_sid(sid.expect("binary encoding resolved a sid"), opened)?;
            },
            Encoding::Text { encoder } => encoder.write_symbol(text, ivm_elision_eligible)?,
        }
        self.end_value(opened)
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_blob(bytes)?,
            Encoding::Text { encoder } => encoder.write_blob(bytes)?,
        }
        self.end_value(opened)
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(lst) = &mut self.lst {
            if lst.in_symbols_list() {
                lst.on_non_string_in_symbols_list();
            }
            return Ok(());
        }
        let opened = self.begin_value()?;
        match &mut self.encoding {
            Encoding::Binary { encoder, .. } => encoder.write_clob(bytes)?,
            Encoding::Text { encoder } => encoder.write_clob(bytes)?,
        }
        self.end_value(opened)
    }

    /// Begins a streaming blob. Only `append_lob`/`finish_lob` calls are
    /// permitted until the lob is finished.
    pub fn start_lob(&mut self, ty: IonType) -> Result<()> {
        if self.lob.is_some() {
            return Err(IonError::InvalidState("a lob is already in progress"));
        }
        self.lob = Some(match ty {
            IonType::Blob => LobState::Blob(Vec::new()),
            IonType::Clob => LobState::Clob(Vec::new()),
            _ => return Err(IonError::InvalidArg("start_lob requires Blob or Clob")),
        });
        Ok(())
    }

    pub fn append_lob(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.lob {
            Some(LobState::Blob(buf)) | Some(LobState::Clob(buf)) => {
                buf.extend_from_slice(bytes);
                Ok(())
            },
            None => Err(IonError::InvalidState("no lob in progress")),
        }
    }

    pub fn finish_lob(&mut self) -> Result<()> {
        let lob = self.lob.take().ok_or(IonError::InvalidState("no lob in progress"))?;
        match lob {
            LobState::Blob(bytes) => self.write_blob(&bytes),
            LobState::Clob(bytes) => self.write_clob(&bytes),
        }
    }

    /// Copies every value the reader visits from its current position
    /// onward (recursing into containers) into this writer.
    pub fn write_all_values(&mut self, reader: &mut dyn Reader) -> Result<()> {
        while let Some(ty) = reader.next()? {
            if let Some(field) = reader.field_name_symbol() {
                if let Some(text) = field.text() {
                    self.write_field_name(text)?;
                }
            }
            for annotation in reader.annotation_symbols() {
                if let Some(text) = annotation.text() {
                    self.add_annotation(text)?;
                } else {
                    return Err(IonError::InvalidSymbol("cannot copy an annotation with unknown text"));
                }
            }
            if reader.is_null() {
                self.write_typed_null(ty)?;
                continue;
            }
            match ty {
                IonType::Null => self.write_typed_null(ty)?,
                IonType::Bool => self.write_bool(reader.read_bool()?)?,
                IonType::Int => self.write_int(&reader.read_int()?)?,
                IonType::Float => self.write_float(reader.read_float()?, false)?,
                IonType::Decimal => self.write_decimal(&reader.read_decimal()?)?,
                IonType::Timestamp => self.write_timestamp(&reader.read_timestamp()?)?,
                IonType::Symbol => {
                    let symbol = reader.read_symbol()?;
                    match symbol.text() {
                        Some(text) => self.write_symbol(text)?,
                        None => return Err(IonError::InvalidSymbol("cannot copy a symbol with unknown text")),
                    }
                },
                IonType::String => self.write_string(&reader.read_string()?)?,
                IonType::Blob => self.write_blob(&reader.read_blob()?)?,
                IonType::Clob => self.write_clob(&reader.read_clob()?)?,
                IonType::List | IonType::Sexp | IonType::Struct => {
                    let kind = ContainerKind::from_ion_type(ty).expect("container type");
                    self.start_container(kind)?;
                    reader.step_in()?;
                    self.write_all_values(reader)?;
                    reader.step_out()?;
                    self.finish_container()?;
                },
            }
        }
        Ok(())
    }

    /// Renders a local-symbol-table append struct naming `$ion_symbol_table`
    /// as its import into its own standalone encoder, so it can be written
    /// to the real output ahead of the scratch bytes already buffered for
    /// values that depend on it. Bypasses LST interception entirely since
    /// this is internal bookkeeping, not a user-driven value.
    fn lst_append_binary_bytes(&self) -> Result<Vec<u8>> {
        let locals: Vec<String> = self.active_table.local_symbols()[self.lst_locals_emitted..].to_vec();
        let lst_sid = encoder_system_sid("$ion_symbol_table");
        let mut encoder = BinaryEncoder::new();
        encoder.start_annotation_wrapper(&[lst_sid])?;
        encoder.start_container(BinaryContainerKind::Struct)?;
        encoder.write_field_sid(encoder_system_sid("imports"))?;
        encoder.write_symbol_sid(lst_sid, false)?;
        encoder.write_field_sid(encoder_system_sid("symbols"))?;
        encoder.start_container(BinaryContainerKind::List)?;
        for text in &locals {
            encoder.write_string(text)?;
        }
        encoder.finish_container()?;
        encoder.finish_container()?;
        encoder.finish_annotation_wrapper()?;
        let mut bytes = Vec::new();
        encoder.flush_to_output(&mut bytes)?;
        Ok(bytes)
    }

    /// Writes a local-symbol-table append struct straight to the text
    /// encoder's sink. Unlike the binary case this cannot be reordered ahead
    /// of values already written, since the text encoder has no scratch
    /// buffer to splice into -- every call so far already reached `out`.
    fn emit_lst_append_text(&mut self) -> Result<()> {
        let locals: Vec<String> = self.active_table.local_symbols()[self.lst_locals_emitted..].to_vec();
        if let Encoding::Text { encoder } = &mut self.encoding {
            encoder.write_annotations(&["$ion_symbol_table".to_string()])?;
            encoder.start_container(TextContainerKind::Struct)?;
            encoder.write_field_name("imports")?;
            encoder.write_symbol("$ion_symbol_table", false)?;
            encoder.write_field_name("symbols")?;
            encoder.start_container(TextContainerKind::List)?;
            for text in &locals {
                encoder.write_string(text)?;
            }
            encoder.finish_container()?;
            encoder.finish_container()?;
        }
        Ok(())
    }

    /// Commits all buffered bytes to the output. If local symbols were
    /// added since the last reset, first emits an LST-append so existing
    /// SIDs remain valid. For binary output the append is written ahead of
    /// the scratch bytes it describes; for text it necessarily trails them
    /// (see `emit_lst_append_text`).
    pub fn flush(&mut self) -> Result<()> {
        self.guard_top_level_state()?;
        let total_locals = self.active_table.local_symbols().len();
        let has_additions = total_locals > self.lst_locals_emitted;
        let is_binary = matches!(self.encoding, Encoding::Binary { .. });
        let lst_prefix = if has_additions && is_binary {
            Some(self.lst_append_binary_bytes()?)
        } else {
            None
        };
        if has_additions && !is_binary {
            self.emit_lst_append_text()?;
        }
        if has_additions {
            self.active_table.lock();
            self.active_table = LocalTable::append_from(&self.active_table);
            self.lst_locals_emitted = total_locals;
        }
        match &mut self.encoding {
            Encoding::Binary { encoder, out } => {
                if let Some(prefix) = lst_prefix {
                    // The LST append must follow the IVM (which, on a
                    // writer's first flush, is still sitting at the front
                    // of this same batch) but precede every value that
                    // depends on its new sids.
                    let mut body = Vec::new();
                    encoder.flush_to_output(&mut body)?;
                    if body.starts_with(&crate::binary::IVM) {
                        out.write_all(&body[..crate::binary::IVM.len()])?;
                        out.write_all(&prefix)?;
                        out.write_all(&body[crate::binary::IVM.len()..])?;
                    } else {
                        out.write_all(&prefix)?;
                        out.write_all(&body)?;
                    }
                } else {
                    encoder.flush_to_output(out)?;
                }
            },
            Encoding::Text { encoder } => encoder.flush()?,
        }
        Ok(())
    }

    /// Flushes, then forces a fresh system context: the writer's symbol
    /// table resets to its originally configured imports and the next
    /// value written is preceded by a new IVM.
    pub fn finish(&mut self) -> Result<()> {
        self.flush()?;
        if let Encoding::Binary { encoder, .. } = &mut self.encoding {
            encoder.reset_context();
        }
        self.active_table = LocalTable::open(self.base_imports.clone(), &self.catalog);
        self.lst_locals_emitted = 0;
        self.arena.rotate();
        Ok(())
    }

    /// Finishes and releases the writer's resources. If a container or lob
    /// was still open, reports `unexpected-eof` but still tears down state.
    pub fn close(mut self) -> Result<()> {
        let result = if !self.container_stack.is_empty() || self.lst.is_some() {
            Err(IonError::UnexpectedEof("writer closed with an open container"))
        } else if self.lob.is_some() {
            Err(IonError::UnexpectedEof("writer closed with a lob in progress"))
        } else {
            self.finish()
        };
        self.container_stack.clear();
        self.lob = None;
        self.lst = None;
        result
    }
}

fn i64_from_bigint(value: &BigInt) -> Option<i64> {
    use num_traits::cast::ToPrimitive;
    value.to_i64()
}

/// Looks up a system symbol's SID by text; panics only if `text` is not one
/// of the nine well-known system symbols, which never happens for the
/// hardcoded calls this function is used for.
fn encoder_system_sid(text: &str) -> u32 {
    crate::symbol::system_table()
        .find_by_name(text)
        .unwrap_or_else(|| panic!("{} is not a system symbol", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SidLookup;
    use crate::writer::WriterOptions;

    #[test]
    fn binary_writer_emits_expected_struct_bytes() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.start_container(ContainerKind::Struct).unwrap();
        writer.write_field_name("name").unwrap(); // a system symbol: sid 4, one byte.
        writer.write_bool(true).unwrap();
        writer.finish_container().unwrap();
        writer.flush().unwrap();
        let out = match writer.encoding {
            Encoding::Binary { out, .. } => out,
            Encoding::Text { .. } => panic!("expected a binary encoder"),
        };
        assert_eq!(out, vec![0xE0, 0x01, 0x00, 0xEA, 0xD2, 0x84, 0x11]);
    }

    #[test]
    fn text_writer_emits_expected_struct_text() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new().text()).unwrap();
        writer.start_container(ContainerKind::Struct).unwrap();
        writer.write_field_name("a").unwrap();
        writer.write_bool(true).unwrap();
        writer.finish_container().unwrap();
        writer.flush().unwrap();
        if let Encoding::Text { encoder } = writer.encoding {
            let out = String::from_utf8(encoder.into_inner()).unwrap();
            assert_eq!(out, "{a:true}");
        } else {
            panic!("expected a text encoder");
        }
    }

    #[test]
    fn field_name_outside_struct_is_rejected() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        assert!(writer.write_field_name("a").is_err());
    }

    #[test]
    fn value_in_struct_without_field_name_is_rejected() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.start_container(ContainerKind::Struct).unwrap();
        assert!(writer.write_bool(true).is_err());
    }

    #[test]
    fn too_many_annotations_is_rejected() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new().max_annotation_count(1)).unwrap();
        writer.add_annotation("a").unwrap();
        assert!(writer.add_annotation("b").is_err());
    }

    #[test]
    fn flush_outside_depth_zero_is_rejected() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.start_container(ContainerKind::List).unwrap();
        assert!(writer.flush().is_err());
    }

    #[test]
    fn closing_with_an_open_container_is_unexpected_eof() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.start_container(ContainerKind::List).unwrap();
        assert!(writer.close().is_err());
    }

    #[test]
    fn binary_flush_writes_lst_append_before_the_values_that_need_it() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.write_symbol("my_symbol").unwrap();
        writer.flush().unwrap();
        let out = match writer.encoding {
            Encoding::Binary { out, .. } => out,
            Encoding::Text { .. } => panic!("expected a binary encoder"),
        };
        // The stream opens with the four-byte IVM. The LST-append struct
        // that follows is annotated $ion_symbol_table: its wrapper's type
        // descriptor is 0xE_. Its byte offset must come before the lone
        // symbol value's byte offset, or a sequential reader would hit an
        // undefined sid.
        assert_eq!(&out[..4], &crate::binary::IVM);
        let lst_offset = out[4..].iter().position(|&b| b & 0xF0 == 0xE0).expect("no annotation wrapper found") + 4;
        let symbol_offset = out.iter().rposition(|&b| b & 0xF0 == 0x70).expect("no symbol value found");
        assert!(lst_offset < symbol_offset, "lst append must precede the value referencing its new sid");
    }

    #[test]
    fn manual_local_symbol_table_struct_replaces_active_table() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.add_annotation("$ion_symbol_table").unwrap();
        writer.start_container(ContainerKind::Struct).unwrap();
        writer.write_field_name("symbols").unwrap();
        writer.start_container(ContainerKind::List).unwrap();
        writer.write_string("sym1").unwrap();
        writer.write_string("sym2").unwrap();
        writer.finish_container().unwrap();
        writer.finish_container().unwrap();

        // With no imports, a manually-declared local table's first entry
        // always lands on sid 10.
        assert_eq!(writer.active_table.find_by_name("sym1"), Some(10));
        assert!(matches!(writer.active_table.find_by_sid(10), Some(SidLookup::Text("sym1"))));

        writer.write_symbol("sym1").unwrap();
        writer.flush().unwrap();
    }

    #[test]
    fn a_symbol_written_again_after_flush_keeps_its_original_sid() {
        let mut writer = Writer::new(Vec::new(), WriterOptions::new()).unwrap();
        writer.write_symbol("sym1").unwrap();
        writer.write_symbol("sym2").unwrap();
        writer.write_symbol("sym3").unwrap();
        writer.flush().unwrap();
        let sym1_sid = writer.active_table.find_by_name("sym1").unwrap();
        let sym3_sid = writer.active_table.find_by_name("sym3").unwrap();

        writer.write_symbol("sym1").unwrap();
        writer.write_symbol("sym3").unwrap();
        writer.write_symbol("sym4").unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.active_table.find_by_name("sym1"), Some(sym1_sid));
        assert_eq!(writer.active_table.find_by_name("sym3"), Some(sym3_sid));
        // sym4 is new in the second batch, so it lands right after the
        // locals carried over from the first flush.
        let sym4_sid = writer.active_table.find_by_name("sym4").unwrap();
        assert_eq!(sym4_sid, sym3_sid + 1);
    }
}
