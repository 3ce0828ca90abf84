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

//! The Ion text encoder.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::quoting::{can_write_unquoted, escape_text};
use crate::decimal::Decimal;
use crate::error::{IonError, Result};
use crate::reader::IonType;
use crate::timestamp::{Precision, Timestamp};

/// The three text container delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Sexp,
    Struct,
}

impl ContainerKind {
    /// `json` down-converts a sexp to list brackets, since JSON has no
    /// parenthesized-list syntax.
    fn open(self, json: bool) -> char {
        match self {
            ContainerKind::List => '[',
            ContainerKind::Sexp => {
                if json {
                    '['
                } else {
                    '('
                }
            },
            ContainerKind::Struct => '{',
        }
    }

    fn close(self, json: bool) -> char {
        match self {
            ContainerKind::List => ']',
            ContainerKind::Sexp => {
                if json {
                    ']'
                } else {
                    ')'
                }
            },
            ContainerKind::Struct => '}',
        }
    }

    fn separator(self, json: bool) -> &'static str {
        match self {
            ContainerKind::List | ContainerKind::Struct => ",",
            ContainerKind::Sexp => {
                if json {
                    ","
                } else {
                    " "
                }
            },
        }
    }
}

struct Frame {
    kind: ContainerKind,
    wrote_first: bool,
}

/// Writes Ion text into `W`, tracking container nesting for separators and
/// (in pretty mode) indentation.
pub struct TextEncoder<W: Write> {
    out: W,
    pretty: bool,
    indent_size: usize,
    ascii_only: bool,
    /// When set, output is down-converted to the JSON subset: annotations
    /// are dropped, symbols/timestamps are quoted like strings, sexps use
    /// list brackets, and blobs become quoted base64 strings.
    json_downconvert: bool,
    stack: Vec<Frame>,
    wrote_top_level_value: bool,
    pending_field: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(out: W, pretty: bool, indent_size: usize, ascii_only: bool, json_downconvert: bool) -> TextEncoder<W> {
        TextEncoder {
            out,
            pretty,
            indent_size,
            ascii_only,
            json_downconvert,
            stack: Vec::new(),
            wrote_top_level_value: false,
            pending_field: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn write_indent(&mut self) -> Result<()> {
        if self.pretty {
            write!(self.out, "\n{}", " ".repeat(self.depth() * self.indent_size)).map_err(IonError::from)?;
        }
        Ok(())
    }

    /// Writes the separator and indentation preceding a value, based on
    /// whether it is the first item in its container (or the first
    /// top-level value).
    fn before_value(&mut self) -> Result<()> {
        if self.pending_field {
            self.pending_field = false;
            return Ok(());
        }
        match self.stack.last_mut() {
            Some(frame) => {
                if frame.wrote_first {
                    write!(self.out, "{}", frame.kind.separator(self.json_downconvert)).map_err(IonError::from)?;
                } else {
                    frame.wrote_first = true;
                }
                self.write_indent()?;
            },
            None => {
                if self.wrote_top_level_value {
                    if self.pretty {
                        writeln!(self.out).map_err(IonError::from)?;
                    } else {
                        write!(self.out, " ").map_err(IonError::from)?;
                    }
                }
                self.wrote_top_level_value = true;
            },
        }
        Ok(())
    }

    pub fn write_annotations(&mut self, texts: &[String]) -> Result<()> {
        // JSON has no annotation syntax: drop them entirely rather than
        // leaving a dangling "::" no JSON reader would accept.
        if texts.is_empty() || self.json_downconvert {
            return Ok(());
        }
        self.before_value()?;
        for text in texts {
            self.write_symbol_text_raw(text)?;
            write!(self.out, "::").map_err(IonError::from)?;
        }
        self.pending_field = true;
        Ok(())
    }

    fn write_symbol_text_raw(&mut self, text: &str) -> Result<()> {
        if self.json_downconvert {
            write!(self.out, "\"{}\"", escape_text(text, '"', self.ascii_only)).map_err(IonError::from)
        } else if can_write_unquoted(text) {
            write!(self.out, "{}", text).map_err(IonError::from)
        } else {
            write!(self.out, "'{}'", escape_text(text, '\'', self.ascii_only)).map_err(IonError::from)
        }
    }

    pub fn write_field_name(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        self.write_symbol_text_raw(text)?;
        write!(self.out, ":").map_err(IonError::from)?;
        self.pending_field = true;
        Ok(())
    }

    pub fn write_null(&mut self, ty: IonType) -> Result<()> {
        self.before_value()?;
        // JSON has one null, with no type annotation syntax.
        if self.json_downconvert {
            return write!(self.out, "null").map_err(IonError::from);
        }
        let name = match ty {
            IonType::Null => "null",
            IonType::Bool => "bool",
            IonType::Int => "int",
            IonType::Float => "float",
            IonType::Decimal => "decimal",
            IonType::Timestamp => "timestamp",
            IonType::Symbol => "symbol",
            IonType::String => "string",
            IonType::Clob => "clob",
            IonType::Blob => "blob",
            IonType::List => "list",
            IonType::Sexp => "sexp",
            IonType::Struct => "struct",
        };
        if ty == IonType::Null {
            write!(self.out, "null").map_err(IonError::from)
        } else {
            write!(self.out, "null.{}", name).map_err(IonError::from)
        }
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.before_value()?;
        write!(self.out, "{}", v).map_err(IonError::from)
    }

    pub fn write_int(&mut self, v: &num_bigint::BigInt) -> Result<()> {
        self.before_value()?;
        write!(self.out, "{}", v).map_err(IonError::from)
    }

    pub fn write_float(&mut self, v: f64) -> Result<()> {
        self.before_value()?;
        if v.is_nan() {
            write!(self.out, "nan").map_err(IonError::from)
        } else if v.is_infinite() {
            write!(self.out, "{}", if v > 0.0 { "+inf" } else { "-inf" }).map_err(IonError::from)
        } else {
            write!(self.out, "{:e}", v).map_err(IonError::from)
        }
    }

    pub fn write_decimal(&mut self, v: &Decimal) -> Result<()> {
        self.before_value()?;
        let sign = if v.is_negative() { "-" } else { "" };
        // JSON numbers have no 'd' exponent marker; fall back to 'e'
        // notation (or a plain integer literal when the exponent is zero),
        // both of which JSON numbers already allow.
        if self.json_downconvert {
            if v.exponent() == 0 {
                write!(self.out, "{}{}", sign, v.magnitude())
            } else {
                write!(self.out, "{}{}e{}", sign, v.magnitude(), v.exponent())
            }
        } else {
            write!(self.out, "{}{}d{}", sign, v.magnitude(), v.exponent())
        }
        .map_err(IonError::from)
    }

    pub fn write_timestamp(&mut self, v: &Timestamp) -> Result<()> {
        use std::fmt::Write as _;

        self.before_value()?;
        let mut text = String::new();
        match v.precision() {
            Precision::Year => write!(text, "{:04}T", v.year_value()),
            Precision::Month => write!(text, "{:04}-{:02}T", v.year_value(), v.month_value()),
            Precision::Day => write!(text, "{:04}-{:02}-{:02}T", v.year_value(), v.month_value(), v.day_value()),
            Precision::Minute | Precision::Second => {
                write!(
                    text,
                    "{:04}-{:02}-{:02}T{:02}:{:02}",
                    v.year_value(),
                    v.month_value(),
                    v.day_value(),
                    v.hour_value(),
                    v.minute_value()
                )
                .expect("writing to a String never fails");
                if v.precision() == Precision::Second {
                    write!(text, ":{:02}", v.second_value()).expect("writing to a String never fails");
                    if let Some(fraction) = v.fraction() {
                        write!(text, ".{}", fraction.magnitude()).expect("writing to a String never fails");
                    }
                }
                match v.offset_minutes() {
                    Some(0) => write!(text, "Z"),
                    Some(mins) => {
                        let sign = if mins < 0 { '-' } else { '+' };
                        write!(text, "{}{:02}:{:02}", sign, mins.abs() / 60, mins.abs() % 60)
                    },
                    None => write!(text, "-00:00"),
                }
            },
        }
        .expect("writing to a String never fails");
        // JSON has no timestamp literal: down-convert to a quoted string,
        // same as the reader's text form but JSON-legal.
        if self.json_downconvert {
            write!(self.out, "\"{}\"", text).map_err(IonError::from)
        } else {
            write!(self.out, "{}", text).map_err(IonError::from)
        }
    }

    /// Writes a symbol value. Per the IVM-elision rule, a bare `$ion_1_0`
    /// at depth 0 with no pending annotations is a silent no-op (otherwise
    /// it would be indistinguishable from a real version marker); the
    /// caller indicates whether the current position qualifies via
    /// `eligible_for_ivm_elision`.
    pub fn write_symbol(&mut self, text: &str, eligible_for_ivm_elision: bool) -> Result<()> {
        if eligible_for_ivm_elision && text == "$ion_1_0" {
            return Ok(());
        }
        self.before_value()?;
        self.write_symbol_text_raw(text)
    }

    pub fn write_string(&mut self, v: &str) -> Result<()> {
        self.before_value()?;
        write!(self.out, "\"{}\"", escape_text(v, '"', self.ascii_only)).map_err(IonError::from)
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> Result<()> {
        self.before_value()?;
        let encoded = BASE64.encode(bytes);
        // JSON has no blob literal: down-convert to a plain base64 string.
        if self.json_downconvert {
            write!(self.out, "\"{}\"", encoded)
        } else {
            write!(self.out, "{{{{{}}}}}", encoded)
        }
        .map_err(IonError::from)
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> Result<()> {
        self.before_value()?;
        let text = String::from_utf8_lossy(bytes);
        let escaped = escape_text(&text, '"', true);
        if self.json_downconvert {
            write!(self.out, "\"{}\"", escaped)
        } else {
            write!(self.out, "{{{{\"{}\"}}}}", escaped)
        }
        .map_err(IonError::from)
    }

    pub fn start_container(&mut self, kind: ContainerKind) -> Result<()> {
        self.before_value()?;
        write!(self.out, "{}", kind.open(self.json_downconvert)).map_err(IonError::from)?;
        self.stack.push(Frame {
            kind,
            wrote_first: false,
        });
        Ok(())
    }

    pub fn finish_container(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or(IonError::InvalidState("no open container to finish"))?;
        if self.pretty && frame.wrote_first {
            write!(self.out, "\n{}", " ".repeat(self.depth() * self.indent_size)).map_err(IonError::from)?;
        }
        write!(self.out, "{}", frame.kind.close(self.json_downconvert)).map_err(IonError::from)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(IonError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn writes_struct_with_field_names_and_commas() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.start_container(ContainerKind::Struct).unwrap();
        enc.write_field_name("abc").unwrap();
        enc.write_int(&BigInt::from(1)).unwrap();
        enc.write_field_name("def").unwrap();
        enc.write_int(&BigInt::from(2)).unwrap();
        enc.finish_container().unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "{abc:1,def:2}");
    }

    #[test]
    fn quotes_non_identifier_symbols() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.write_symbol("hello world", false).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "'hello world'");
    }

    #[test]
    fn ion_1_0_is_elided_when_eligible() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.write_symbol("$ion_1_0", true).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn ion_1_0_is_quoted_when_not_eligible_for_elision() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.write_symbol("$ion_1_0", false).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "'$ion_1_0'");
    }

    #[test]
    fn annotations_chain_without_spaces() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.write_annotations(&["a".to_string(), "b".to_string()]).unwrap();
        enc.write_bool(true).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "a::b::true");
    }

    #[test]
    fn utc_timestamp_uses_z_suffix() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        let ts = Timestamp::minute(2000, 1, 2, 3, 4, Some(0)).unwrap();
        enc.write_timestamp(&ts).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "2000-01-02T03:04Z");
    }

    #[test]
    fn unknown_offset_uses_negative_zero_suffix() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        let ts = Timestamp::minute(2000, 1, 2, 3, 4, None).unwrap();
        enc.write_timestamp(&ts).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "2000-01-02T03:04-00:00");
    }

    #[test]
    fn top_level_values_are_space_separated_when_not_pretty() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, false);
        enc.write_bool(true).unwrap();
        enc.write_bool(false).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "true false");
    }

    #[test]
    fn json_downconvert_drops_annotations_and_quotes_symbols() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, true);
        enc.write_annotations(&["a".to_string()]).unwrap();
        enc.write_symbol("abc", false).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "\"abc\"");
    }

    #[test]
    fn json_downconvert_renders_sexp_as_a_list() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, true);
        enc.start_container(ContainerKind::Sexp).unwrap();
        enc.write_int(&BigInt::from(1)).unwrap();
        enc.write_int(&BigInt::from(2)).unwrap();
        enc.finish_container().unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "[1,2]");
    }

    #[test]
    fn json_downconvert_renders_decimal_with_e_notation() {
        use num_bigint::BigUint;

        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, true);
        enc.write_decimal(&Decimal::new(false, BigUint::from(15u32), -3)).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "15e-3");
    }

    #[test]
    fn json_downconvert_quotes_timestamps_and_blobs() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, true);
        let ts = Timestamp::minute(2000, 1, 2, 3, 4, Some(0)).unwrap();
        enc.write_timestamp(&ts).unwrap();
        enc.write_blob(b"hi").unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "\"2000-01-02T03:04Z\" \"aGk=\"");
    }

    #[test]
    fn json_downconvert_writes_a_bare_null_for_any_typed_null() {
        let mut enc = TextEncoder::new(Vec::new(), false, 2, false, true);
        enc.write_null(IonType::Struct).unwrap();
        let out = String::from_utf8(enc.into_inner()).unwrap();
        assert_eq!(out, "null");
    }
}
