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

//! The binary encoder: writes into a scratch stream with no length
//! prefixes, recording [`BinaryPatch`]es for containers and annotation
//! wrappers, then replays the scratch stream through [`BinaryEncoder::flush_to_output`]
//! with synthesized headers.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use super::patch::{PatchStack, TID_ANNOTATION, TID_LIST, TID_SEXP, TID_STRUCT};
use super::varint::{write_negative_zero_var_int, write_var_int, write_var_uint};
use crate::decimal::Decimal;
use crate::error::{IonError, Result};
use crate::reader::IonType;
use crate::timestamp::{Precision, Timestamp};

/// The four-byte Ion version marker.
pub const IVM: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

const TID_NULL: u8 = 0x0;
const TID_BOOL: u8 = 0x1;
const TID_POS_INT: u8 = 0x2;
const TID_NEG_INT: u8 = 0x3;
const TID_FLOAT: u8 = 0x4;
const TID_DECIMAL: u8 = 0x5;
const TID_TIMESTAMP: u8 = 0x6;
const TID_SYMBOL: u8 = 0x7;
const TID_STRING: u8 = 0x8;
const TID_CLOB: u8 = 0x9;
const TID_BLOB: u8 = 0xA;

fn type_null_nibble(ty: IonType) -> u8 {
    match ty {
        IonType::Null => TID_NULL,
        IonType::Bool => TID_BOOL,
        IonType::Int => TID_POS_INT,
        IonType::Float => TID_FLOAT,
        IonType::Decimal => TID_DECIMAL,
        IonType::Timestamp => TID_TIMESTAMP,
        IonType::Symbol => TID_SYMBOL,
        IonType::String => TID_STRING,
        IonType::Clob => TID_CLOB,
        IonType::Blob => TID_BLOB,
        IonType::List => TID_LIST,
        IonType::Sexp => TID_SEXP,
        IonType::Struct => TID_STRUCT,
    }
}

/// Which kind of container is being opened, mapped to its type nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Sexp,
    Struct,
}

impl ContainerKind {
    fn type_code(self) -> u8 {
        match self {
            ContainerKind::List => TID_LIST,
            ContainerKind::Sexp => TID_SEXP,
            ContainerKind::Struct => TID_STRUCT,
        }
    }
}

/// Encodes the signed-magnitude "Int" subfield shared by decimal
/// coefficients and timestamp fractions: big-endian minimal bytes with the
/// sign folded into the top bit of the first byte (distinct from the
/// type-2/type-3 top-level int encoding, which signals sign via the type
/// nibble instead).
fn encode_signed_magnitude(negative: bool, magnitude: &num_bigint::BigUint) -> Vec<u8> {
    if magnitude.is_zero() {
        return if negative { vec![0x80] } else { Vec::new() };
    }
    let mut bytes = magnitude.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    if negative {
        bytes[0] |= 0x80;
    }
    bytes
}

fn encode_decimal_payload(value: &Decimal) -> Vec<u8> {
    let mut payload = Vec::new();
    if value.is_zero() && !value.is_negative() && value.exponent() == 0 {
        return payload; // a "true" 0d0: zero-length representation.
    }
    write_var_int(&mut payload, value.exponent());
    if value.is_zero() {
        if value.is_negative() {
            payload.push(0x80);
        }
        // positive zero with a non-zero exponent: no coefficient bytes at all.
    } else {
        payload.extend(encode_signed_magnitude(value.is_negative(), value.magnitude()));
    }
    payload
}

fn encode_timestamp_payload(value: &Timestamp) -> Vec<u8> {
    let mut payload = Vec::new();
    match value.offset_minutes() {
        Some(mins) => write_var_int(&mut payload, mins as i64),
        None => write_negative_zero_var_int(&mut payload),
    }
    write_var_uint(&mut payload, value.year_value() as u64);
    if value.precision() >= Precision::Month {
        write_var_uint(&mut payload, value.month_value() as u64);
    }
    if value.precision() >= Precision::Day {
        write_var_uint(&mut payload, value.day_value() as u64);
    }
    if value.precision() >= Precision::Minute {
        write_var_uint(&mut payload, value.hour_value() as u64);
        write_var_uint(&mut payload, value.minute_value() as u64);
    }
    if value.precision() >= Precision::Second {
        write_var_uint(&mut payload, value.second_value() as u64);
        if let Some(fraction) = value.fraction() {
            write_var_int(&mut payload, fraction.exponent());
            if fraction.is_zero() {
                if fraction.is_negative() {
                    payload.push(0x80);
                }
            } else {
                payload.extend(encode_signed_magnitude(fraction.is_negative(), fraction.magnitude()));
            }
        }
    }
    payload
}

/// Writes Ion binary into an in-memory scratch stream, then replays it with
/// back-patched container and annotation-wrapper headers.
pub struct BinaryEncoder {
    scratch: Vec<u8>,
    patches: PatchStack,
    ivm_written: bool,
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryEncoder {
    pub fn new() -> BinaryEncoder {
        BinaryEncoder {
            scratch: Vec::new(),
            patches: PatchStack::new(),
            ivm_written: false,
        }
    }

    /// Like [`BinaryEncoder::new`], but pre-sizes the scratch buffer to
    /// `temp_buffer_size` bytes to avoid reallocating as the first values
    /// are written.
    pub fn with_capacity(temp_buffer_size: usize) -> BinaryEncoder {
        BinaryEncoder {
            scratch: Vec::with_capacity(temp_buffer_size),
            patches: PatchStack::new(),
            ivm_written: false,
        }
    }

    /// Writes the four-byte IVM, unless one has already been written since
    /// the last reset.
    pub fn write_ivm(&mut self) -> Result<()> {
        if self.ivm_written {
            return Ok(());
        }
        self.scratch.extend_from_slice(&IVM);
        self.ivm_written = true;
        Ok(())
    }

    /// Forces the next flush to re-emit an IVM (used by the writer's
    /// `finish`).
    pub fn reset_context(&mut self) {
        self.ivm_written = false;
    }

    pub fn depth(&self) -> usize {
        self.patches.depth()
    }

    fn emit_typed(&mut self, type_code: u8, payload: &[u8]) {
        let len = payload.len();
        if len < 14 {
            self.scratch.push((type_code << 4) | len as u8);
            self.patches.add_bytes(1);
        } else {
            self.scratch.push((type_code << 4) | 0xE);
            let before = self.scratch.len();
            write_var_uint(&mut self.scratch, len as u64);
            self.patches.add_bytes(1 + (self.scratch.len() - before) as u64);
        }
        self.scratch.extend_from_slice(payload);
        self.patches.add_bytes(len as u64);
    }

    pub fn write_null(&mut self, ty: IonType) -> Result<()> {
        self.scratch.push((type_null_nibble(ty) << 4) | 0xF);
        self.patches.add_bytes(1);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.scratch.push((TID_BOOL << 4) | value as u8);
        self.patches.add_bytes(1);
        Ok(())
    }

    pub fn write_int(&mut self, value: &BigInt) -> Result<()> {
        let (sign, magnitude) = value.to_bytes_be();
        match sign {
            Sign::NoSign => self.emit_typed(TID_POS_INT, &[]),
            Sign::Plus => self.emit_typed(TID_POS_INT, &magnitude),
            Sign::Minus => self.emit_typed(TID_NEG_INT, &magnitude),
        }
        Ok(())
    }

    pub fn write_float(&mut self, value: f64, compact: bool) -> Result<()> {
        if value == 0.0 && value.is_sign_positive() {
            self.emit_typed(TID_FLOAT, &[]);
            return Ok(());
        }
        let mut payload = Vec::new();
        if compact {
            let as_f32 = value as f32;
            if as_f32 as f64 == value {
                payload
                    .write_f32::<BigEndian>(as_f32)
                    .map_err(IonError::from)?;
                self.emit_typed(TID_FLOAT, &payload);
                return Ok(());
            }
        }
        payload.write_f64::<BigEndian>(value).map_err(IonError::from)?;
        self.emit_typed(TID_FLOAT, &payload);
        Ok(())
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> Result<()> {
        let payload = encode_decimal_payload(value);
        self.emit_typed(TID_DECIMAL, &payload);
        Ok(())
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> Result<()> {
        let payload = encode_timestamp_payload(value);
        self.emit_typed(TID_TIMESTAMP, &payload);
        Ok(())
    }

    /// Writes a symbol value's SID. Per the IVM-elision rule, SID 2
    /// (`$ion_1_0`) at depth 0 with no pending annotations is a silent
    /// no-op (a bare `$ion_1_0` symbol value would be indistinguishable
    /// from another IVM).
    pub fn write_symbol_sid(&mut self, sid: u32, annotated: bool) -> Result<()> {
        const SID_ION_1_0: u32 = 2;
        if sid == SID_ION_1_0 && self.patches.depth() == 0 && !annotated {
            return Ok(());
        }
        if sid == 0 {
            self.emit_typed(TID_SYMBOL, &[]);
            return Ok(());
        }
        let full = sid.to_be_bytes();
        let first_nonzero = full.iter().position(|&b| b != 0).unwrap_or(3);
        self.emit_typed(TID_SYMBOL, &full[first_nonzero..]);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.emit_typed(TID_STRING, value.as_bytes());
        Ok(())
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> Result<()> {
        self.emit_typed(TID_BLOB, bytes);
        Ok(())
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> Result<()> {
        self.emit_typed(TID_CLOB, bytes);
        Ok(())
    }

    pub fn write_field_sid(&mut self, sid: u32) -> Result<()> {
        let before = self.scratch.len();
        write_var_uint(&mut self.scratch, sid as u64);
        self.patches.add_bytes((self.scratch.len() - before) as u64);
        Ok(())
    }

    pub fn start_container(&mut self, kind: ContainerKind) -> Result<()> {
        let offset = self.scratch.len();
        self.patches.open(offset, kind.type_code());
        Ok(())
    }

    pub fn finish_container(&mut self) -> Result<()> {
        self.patches
            .close()
            .map(|_| ())
            .ok_or(IonError::InvalidState("no open container to finish"))
    }

    /// Opens an annotation wrapper, writing its (already-known-length)
    /// annotation-SID list immediately, before the wrapped value follows.
    pub fn start_annotation_wrapper(&mut self, sids: &[u32]) -> Result<()> {
        let offset = self.scratch.len();
        self.patches.open(offset, TID_ANNOTATION);
        let mut annot_bytes = Vec::new();
        for &sid in sids {
            write_var_uint(&mut annot_bytes, sid as u64);
        }
        let before = self.scratch.len();
        write_var_uint(&mut self.scratch, annot_bytes.len() as u64);
        self.scratch.extend_from_slice(&annot_bytes);
        self.patches
            .add_bytes((self.scratch.len() - before) as u64);
        Ok(())
    }

    pub fn finish_annotation_wrapper(&mut self) -> Result<()> {
        self.patches
            .close()
            .map(|_| ())
            .ok_or(IonError::InvalidState("no open annotation wrapper to finish"))
    }

    /// Replays the scratch stream through `out`, synthesizing each patch's
    /// type-descriptor header at its recorded offset, then clears all
    /// buffered state.
    pub fn flush_to_output<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if !self.patches.is_empty() {
            return Err(IonError::UnexpectedEof("container still open at flush"));
        }
        let patches = self.patches.drain();
        let mut cursor = 0usize;
        for patch in &patches {
            out.write_all(&self.scratch[cursor..patch.offset])
                .map_err(IonError::from)?;
            if patch.length < 14 {
                out.write_all(&[(patch.type_code << 4) | patch.length as u8])
                    .map_err(IonError::from)?;
            } else {
                out.write_all(&[(patch.type_code << 4) | 0xE])
                    .map_err(IonError::from)?;
                let mut len_bytes = Vec::new();
                write_var_uint(&mut len_bytes, patch.length);
                out.write_all(&len_bytes).map_err(IonError::from)?;
            }
            cursor = patch.offset;
        }
        out.write_all(&self.scratch[cursor..]).map_err(IonError::from)?;
        self.scratch.clear();
        Ok(())
    }

    /// True if the scratch stream has buffered but unflushed bytes.
    pub fn has_buffered_bytes(&self) -> bool {
        !self.scratch.is_empty()
    }
}
