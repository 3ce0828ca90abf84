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

//! Arbitrary-precision decimals.
//!
//! Ion decimals need two things a plain signed [`BigInt`](num_bigint::BigInt)
//! cannot express: a coefficient of exactly zero length (meaning zero) and a
//! "negative zero" coefficient, which is a distinct bit pattern from
//! "positive zero" even though both represent the numeric value zero. The
//! sign is therefore tracked independently of the magnitude, the way the
//! teacher tracks BPXSD's own numeric variants as distinct representations
//! rather than folding them into one generic number type.

use num_bigint::BigUint;
use num_traits::Zero;

/// Rounding mode for a [`DecimalContext`], mirroring `decNumber`'s
/// `DEC_ROUND_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    HalfEven,
    HalfUp,
    HalfDown,
    Up,
    Down,
    Ceiling,
    Floor,
}

/// Precision/rounding settings for decimal arithmetic, mirroring `ion-c`'s
/// `decContext`. This crate only constructs and validates decimals (no
/// arithmetic, per scope); a context is accepted and stored by the writer
/// options so a future arithmetic layer has somewhere to read it from, but
/// nothing here currently consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    pub precision: u32,
    pub rounding: RoundingMode,
}

impl Default for DecimalContext {
    fn default() -> Self {
        DecimalContext {
            precision: 9,
            rounding: RoundingMode::HalfEven,
        }
    }
}

/// An arbitrary-precision decimal: `sign * magnitude * 10^exponent`.
#[derive(Debug, Clone)]
pub struct Decimal {
    negative: bool,
    magnitude: BigUint,
    exponent: i64,
}

impl Decimal {
    /// Builds a decimal from a sign, an unsigned magnitude, and an exponent.
    pub fn new(negative: bool, magnitude: BigUint, exponent: i64) -> Decimal {
        Decimal {
            negative,
            magnitude,
            exponent,
        }
    }

    /// The decimal `0.` with a positive zero coefficient.
    pub fn zero() -> Decimal {
        Decimal {
            negative: false,
            magnitude: BigUint::zero(),
            exponent: 0,
        }
    }

    /// A negative-zero coefficient at the given exponent (e.g. `-0d-2`).
    pub fn negative_zero(exponent: i64) -> Decimal {
        Decimal {
            negative: true,
            magnitude: BigUint::zero(),
            exponent,
        }
    }

    /// True if the magnitude is zero (regardless of sign).
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// True if this is specifically the negative-zero coefficient.
    pub fn is_negative_zero(&self) -> bool {
        self.negative && self.magnitude.is_zero()
    }

    /// The coefficient's sign bit.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The coefficient's unsigned magnitude.
    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    /// The decimal exponent.
    pub fn exponent(&self) -> i64 {
        self.exponent
    }
}

/// Bit-for-bit equality of the unscaled-value/exponent representation, not
/// numeric equivalence: `1d1` and `10d0` compare unequal even though both
/// denote the value ten, and `0d0`/`-0d0` also compare unequal.
impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.exponent == other.exponent
            && self.magnitude == other.magnitude
            && self.negative == other.negative
    }
}

impl Eq for Decimal {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_scales_are_not_bit_equal() {
        let a = Decimal::new(false, BigUint::from(1u32), 1);
        let b = Decimal::new(false, BigUint::from(10u32), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn negative_zero_is_distinct_from_positive_zero() {
        let pos = Decimal::zero();
        let neg = Decimal::negative_zero(0);
        assert_ne!(pos, neg);
        assert!(pos.is_zero());
        assert!(neg.is_zero());
        assert!(!pos.is_negative_zero());
        assert!(neg.is_negative_zero());
    }

    #[test]
    fn roundtrips_a_long_coefficient() {
        // 1.1999999999999999555910790149937383830547332763671875
        let digits = "11999999999999999555910790149937383830547332763671875";
        let magnitude: BigUint = digits.parse().unwrap();
        let d = Decimal::new(false, magnitude.clone(), -53);
        assert_eq!(d.magnitude(), &magnitude);
        assert_eq!(d.exponent(), -53);
    }
}
