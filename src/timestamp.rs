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

//! Ion timestamps: calendar validity is delegated to `chrono`, but the
//! precision tracking (year-only, year-month, date, date-time with minute or
//! second precision, optional fraction) and the "offset unknown" state are
//! Ion-specific and have no equivalent in `chrono` alone.

use chrono::NaiveDate;

use crate::decimal::Decimal;
use crate::error::{IonError, Result};

/// How much of a timestamp's clock fields are significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    /// Only the year is significant.
    Year,
    /// Year and month.
    Month,
    /// Year, month, and day.
    Day,
    /// Date plus hour and minute (no seconds).
    Minute,
    /// Date plus hour, minute, and second.
    Second,
}

/// An Ion timestamp.
///
/// The offset is `None` when unknown (encoded on the wire as the VarInt
/// negative-zero byte `0xC0`), or `Some(minutes)` relative to UTC when known,
/// including `Some(0)` for a timestamp that is explicitly UTC (`Z`).
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    precision: Precision,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Option<Decimal>,
    offset_minutes: Option<i32>,
}

impl Timestamp {
    /// Builds a year-precision timestamp (e.g. `2000T`).
    pub fn year(year: u16) -> Result<Timestamp> {
        Self::validated(Precision::Year, year, 1, 1, 0, 0, 0, None, None)
    }

    /// Builds a year-month-precision timestamp (e.g. `2000-08T`).
    pub fn month(year: u16, month: u8) -> Result<Timestamp> {
        Self::validated(Precision::Month, year, month, 1, 0, 0, 0, None, None)
    }

    /// Builds a date-precision timestamp (e.g. `2000-08-07T`).
    pub fn day(year: u16, month: u8, day: u8) -> Result<Timestamp> {
        Self::validated(Precision::Day, year, month, day, 0, 0, 0, None, None)
    }

    /// Builds a minute-precision timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn minute(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        offset_minutes: Option<i32>,
    ) -> Result<Timestamp> {
        Self::validated(
            Precision::Minute,
            year,
            month,
            day,
            hour,
            minute,
            0,
            None,
            offset_minutes,
        )
    }

    /// Builds a second-precision timestamp, optionally with a fractional
    /// second component.
    #[allow(clippy::too_many_arguments)]
    pub fn second(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        offset_minutes: Option<i32>,
    ) -> Result<Timestamp> {
        Self::validated(
            Precision::Second,
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            offset_minutes,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn validated(
        precision: Precision,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        fraction: Option<Decimal>,
        offset_minutes: Option<i32>,
    ) -> Result<Timestamp> {
        if NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).is_none() {
            return Err(IonError::InvalidTimestamp("calendar date out of range"));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(IonError::InvalidTimestamp("clock field out of range"));
        }
        if let Some(mins) = offset_minutes {
            if !(-23 * 60 - 59..=23 * 60 + 59).contains(&mins) {
                return Err(IonError::InvalidTimestamp("offset out of range"));
            }
        }
        Ok(Timestamp {
            precision,
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            offset_minutes,
        })
    }

    /// The timestamp's declared precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Four-digit year.
    pub fn year_value(&self) -> u16 {
        self.year
    }

    /// Month (1-12), meaningful when `precision >= Month`.
    pub fn month_value(&self) -> u8 {
        self.month
    }

    /// Day of month (1-31), meaningful when `precision >= Day`.
    pub fn day_value(&self) -> u8 {
        self.day
    }

    /// Hour (0-23), meaningful when `precision >= Minute`.
    pub fn hour_value(&self) -> u8 {
        self.hour
    }

    /// Minute (0-59), meaningful when `precision >= Minute`.
    pub fn minute_value(&self) -> u8 {
        self.minute
    }

    /// Second (0-59), meaningful when `precision == Second`.
    pub fn second_value(&self) -> u8 {
        self.second
    }

    /// Fractional seconds, if any, meaningful when `precision == Second`.
    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// UTC offset in minutes, or `None` if unknown. Only meaningful when
    /// `precision >= Minute`.
    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_calendar_date() {
        assert!(Timestamp::day(2001, 2, 29).is_err());
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(Timestamp::minute(2000, 1, 1, 0, 0, Some(24 * 60)).is_err());
    }

    #[test]
    fn accepts_unknown_offset() {
        let t = Timestamp::minute(2000, 1, 1, 0, 0, None).unwrap();
        assert_eq!(t.offset_minutes(), None);
    }

    #[test]
    fn second_precision_with_fraction_round_trips_fields() {
        let frac = Decimal::new(false, num_bigint::BigUint::from(15u32), -3);
        let t = Timestamp::second(2000, 8, 7, 0, 0, 0, Some(frac.clone()), Some(0)).unwrap();
        assert_eq!(t.precision(), Precision::Second);
        assert_eq!(t.fraction(), Some(&frac));
        assert_eq!(t.offset_minutes(), Some(0));
    }
}
