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

//! Bit-for-bit checks of scalar payload encoding. The crate has no
//! byte-level decoder (that's a reader concern, out of scope here), so
//! these compare the encoder's output against hand-computed expected
//! bytes rather than round-tripping through a decode step.

use num_bigint::BigUint;

use ion_core::binary::BinaryEncoder;
use ion_core::decimal::Decimal;
use ion_core::timestamp::Timestamp;

#[test]
fn decimal_payload_is_varint_exponent_then_signed_magnitude_coefficient() {
    // 15e-3: exponent -3 as a VarInt is 0xC3 (magnitude 3, sign bit 0x40,
    // end bit 0x80 all in the one byte it fits in). The coefficient 15 is
    // 0x0F, whose top bit is already clear so it needs no padding byte.
    let value = Decimal::new(false, BigUint::from(15u32), -3);
    let mut encoder = BinaryEncoder::new();
    encoder.write_decimal(&value).unwrap();

    let mut out = Vec::new();
    encoder.flush_to_output(&mut out).unwrap();

    assert_eq!(out.as_slice(), &[0x52, 0xC3, 0x0F]);
}

#[test]
fn true_zero_decimal_has_a_zero_length_payload() {
    // A "true" 0d0 (positive zero coefficient, zero exponent) is the one
    // case with no payload bytes at all, not even the exponent.
    let value = Decimal::zero();
    let mut encoder = BinaryEncoder::new();
    encoder.write_decimal(&value).unwrap();

    let mut out = Vec::new();
    encoder.flush_to_output(&mut out).unwrap();

    assert_eq!(out.as_slice(), &[0x50]);
}

#[test]
fn negative_zero_decimal_with_an_exponent_keeps_a_sign_byte() {
    // -0d-2: the exponent is non-zero so the zero-length shortcut doesn't
    // apply, and the coefficient collapses to a single sign byte (0x80)
    // instead of the usual signed-magnitude encoding.
    let value = Decimal::negative_zero(-2);
    let mut encoder = BinaryEncoder::new();
    encoder.write_decimal(&value).unwrap();

    let mut out = Vec::new();
    encoder.flush_to_output(&mut out).unwrap();

    assert_eq!(out.as_slice(), &[0x52, 0xC2, 0x80]);
}

#[test]
fn timestamp_payload_opens_with_the_unknown_offset_sentinel() {
    // Day-precision timestamps never carry an offset, so the payload
    // always opens with the 0xC0 "unknown offset" VarInt sentinel.
    let value = Timestamp::day(2000, 1, 1).unwrap();
    let mut encoder = BinaryEncoder::new();
    encoder.write_timestamp(&value).unwrap();

    let mut out = Vec::new();
    encoder.flush_to_output(&mut out).unwrap();

    // offset: 0xC0; year 2000 as a two-byte VarUInt: 0x0F, 0xD0; month 1
    // and day 1 as single-byte VarUInts: 0x81, 0x81. Header is
    // TID_TIMESTAMP with length 5.
    assert_eq!(out.as_slice(), &[0x65, 0xC0, 0x0F, 0xD0, 0x81, 0x81]);
}

#[test]
fn symbol_sid_is_encoded_as_raw_big_endian_bytes_not_a_varint() {
    // Symbol SIDs are emitted as the minimal big-endian representation of
    // the integer, never as a VarUInt: 300 takes exactly two raw bytes
    // (0x01, 0x2C), not whatever a continuation-bit encoding would need.
    let mut encoder = BinaryEncoder::new();
    encoder.write_symbol_sid(300, false).unwrap();

    let mut out = Vec::new();
    encoder.flush_to_output(&mut out).unwrap();

    assert_eq!(out.as_slice(), &[0x72, 0x01, 0x2C]);
}
