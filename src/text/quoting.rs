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

//! Symbol identifier recognition and string/symbol escaping for the text
//! encoder.

/// Reserved words that are never valid unquoted symbol text, even when they
/// otherwise match the identifier grammar.
const RESERVED_WORDS: [&str; 6] = ["null", "true", "false", "nan", "+inf", "-inf"];

/// True if `text` matches the bare-identifier grammar: a leading
/// letter/underscore/`$`, then any number of letters/digits/underscore/`$`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// True if `text` may be written bare (unquoted) as a symbol.
///
/// `$ion_1_0` is always excluded: outside the one position where it is
/// elided as an IVM no-op, a literal `$ion_1_0` symbol must be quoted so it
/// cannot be mistaken for a version marker.
pub fn can_write_unquoted(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if RESERVED_WORDS.contains(&text) || text == "$ion_1_0" {
        return false;
    }
    is_identifier(text)
}

/// Escapes `text` for a double- or single-quoted symbol/string literal.
/// Control bytes, backslash, and `quote_char` are escaped; when
/// `ascii_only` is set, all non-ASCII code points are escaped as `\uXXXX`,
/// using a UTF-16 surrogate pair of two `\uXXXX` escapes for code points
/// above the Basic Multilingual Plane.
pub fn escape_text(text: &str, quote_char: char, ascii_only: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c == quote_char => {
                out.push('\\');
                out.push(c);
            },
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (c as u32) == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            },
            c if ascii_only && (c as u32) > 0x7f => {
                push_unicode_escape(&mut out, c);
            },
            c => out.push(c),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, c: char) {
    let code_point = c as u32;
    if code_point <= 0xFFFF {
        out.push_str(&format!("\\u{:04x}", code_point));
    } else {
        // Above the BMP: split into a UTF-16 surrogate pair, each written as
        // its own \u escape.
        let v = code_point - 0x10000;
        let high = 0xD800 + (v >> 10);
        let low = 0xDC00 + (v & 0x3FF);
        out.push_str(&format!("\\u{:04x}", high));
        out.push_str(&format!("\\u{:04x}", low));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_are_unquoted() {
        assert!(can_write_unquoted("abc"));
        assert!(can_write_unquoted("_abc123"));
        assert!(can_write_unquoted("$foo"));
    }

    #[test]
    fn reserved_words_require_quoting() {
        assert!(!can_write_unquoted("null"));
        assert!(!can_write_unquoted("true"));
        assert!(!can_write_unquoted("+inf"));
    }

    #[test]
    fn ion_1_0_requires_quoting_even_though_it_is_an_identifier() {
        assert!(!can_write_unquoted("$ion_1_0"));
    }

    #[test]
    fn non_identifier_symbols_require_quoting() {
        assert!(!can_write_unquoted("hello world"));
        assert!(!can_write_unquoted(""));
        assert!(!can_write_unquoted("123abc"));
    }

    #[test]
    fn escape_text_handles_control_bytes_and_quote_char() {
        let escaped = escape_text("a\"b\nc", '"', false);
        assert_eq!(escaped, "a\\\"b\\nc");
    }

    #[test]
    fn ascii_only_mode_escapes_non_ascii_codepoints() {
        let escaped = escape_text("caf\u{e9}", '"', true);
        assert_eq!(escaped, "caf\\u00e9");
    }

    #[test]
    fn ascii_only_mode_splits_astral_codepoints_into_a_surrogate_pair() {
        let escaped = escape_text("\u{1F600}", '"', true);
        assert_eq!(escaped, "\\ud83d\\ude00");
    }
}
