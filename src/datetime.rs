//! Calendar model and time register encoding for the DS3231 RTC.
//!
//! [`CivilDateTime`] is a small calendar instant covering 2000-2099, the
//! range the DS3231 year register can hold. It converts to and from a
//! 32-bit count of seconds since 1970-01-01, which is the interchange value
//! used for arithmetic.
//!
//! # Leap years
//!
//! Every year offset divisible by 4 is a leap year. There is no century
//! rule, which is exact for 2000-2099 (2000 is a leap year).
//!
//! # Lenient construction
//!
//! [`CivilDateTime::new`] never fails. Fields above their ceiling are
//! clamped: month to 12, day to 31, hour to 23, minute and second to 60.
//! The 60 ceiling for minutes and seconds is long standing behaviour and is
//! kept as is. Lower bounds are not clamped; alarm read-back produces day 0.
//!
//! # Register Model
//!
//! The DS3231 stores date and time in 7 consecutive registers:
//! Seconds, Minutes, Hours, Day, Date, Month, Year. The day of week register
//! is written as 0 and ignored on read.

use core::fmt;
use core::ops::AddAssign;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::bcd::{from_bcd, to_bcd};
use crate::{Hours, Month, Seconds};

/// Seconds between 1970-01-01 and 2000-01-01.
pub const SECONDS_FROM_1970_TO_2000: u32 = 946_684_800;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// 2099-12-31 23:59:59, the last representable instant.
const LAST_SECOND_OF_2099: u32 = SECONDS_FROM_1970_TO_2000 + 36_525 * SECONDS_PER_DAY - 1;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const WEEKDAYS_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A civil date and time between 2000-01-01 00:00:00 and 2099-12-31 23:59:59.
///
/// The value is immutable; arithmetic such as [`add_seconds`](Self::add_seconds)
/// returns a new instant rebuilt from epoch seconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CivilDateTime {
    year_offset: u8,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl CivilDateTime {
    /// Creates an instant, clamping out of range fields instead of failing.
    ///
    /// `year` may be given either as a full year (`2024`) or as an offset
    /// from 2000 (`24`). The offset saturates at 99, and full years before
    /// 2000 (100-1999) become 2000.
    ///
    /// ```
    /// use ds3231_rtc::CivilDateTime;
    ///
    /// let dt = CivilDateTime::new(2024, 13, 40, 25, 70, 70);
    /// assert_eq!((dt.month(), dt.day(), dt.hour()), (12, 31, 23));
    /// assert_eq!((dt.minute(), dt.second()), (60, 60));
    /// ```
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let year = match year {
            0..=99 => year,
            100..=1999 => 0,
            _ => year - 2000,
        };
        Self {
            year_offset: u8::try_from(year.min(99)).unwrap_or(99),
            month: month.min(12),
            day: day.min(31),
            hour: hour.min(23),
            minute: minute.min(60),
            second: second.min(60),
        }
    }

    /// Builds an instant from seconds since 1970-01-01 00:00:00.
    ///
    /// Values before 2000-01-01 saturate to 2000-01-01 00:00:00 and values
    /// after 2099-12-31 23:59:59 saturate to that instant.
    #[must_use]
    pub fn from_epoch_seconds(seconds: u32) -> Self {
        let mut t = seconds
            .min(LAST_SECOND_OF_2099)
            .saturating_sub(SECONDS_FROM_1970_TO_2000);

        let second = (t % 60) as u8;
        t /= 60;
        let minute = (t % 60) as u8;
        t /= 60;
        let hour = (t % 24) as u8;
        let mut days = t / 24;

        let mut year_offset: u8 = 0;
        let mut leap;
        loop {
            leap = year_offset % 4 == 0;
            let days_in_year = 365 + u32::from(leap);
            if days < days_in_year {
                break;
            }
            days -= days_in_year;
            year_offset += 1;
        }

        let mut month: u8 = 1;
        loop {
            let mut days_in_month = u32::from(DAYS_IN_MONTH[usize::from(month - 1)]);
            if leap && month == 2 {
                days_in_month += 1;
            }
            // December always ends the walk, the year loop left fewer days than a year
            if days < days_in_month || month == 12 {
                break;
            }
            days -= days_in_month;
            month += 1;
        }

        Self {
            year_offset,
            month,
            day: (days + 1) as u8,
            hour,
            minute,
            second,
        }
    }

    /// Seconds since 1970-01-01 00:00:00.
    #[must_use]
    pub fn to_epoch_seconds(&self) -> u32 {
        let days = self.days_since_2000();
        ((days * 24 + u32::from(self.hour)) * 60 + u32::from(self.minute)) * 60
            + u32::from(self.second)
            + SECONDS_FROM_1970_TO_2000
    }

    /// Whole days between 2000-01-01 and this date.
    ///
    /// Partial instants with day 0 (alarm 2 read-back) count as the last day
    /// of the previous month; on 2000-01-01 itself this saturates at 0.
    #[must_use]
    pub fn days_since_2000(&self) -> u32 {
        let y = u32::from(self.year_offset);
        let mut days = u32::from(self.day);
        for m in 1..self.month {
            days += u32::from(DAYS_IN_MONTH[usize::from(m - 1)]);
        }
        if self.month > 2 && self.is_leap_year() {
            days += 1;
        }
        (days + 365 * y + (y + 3) / 4).saturating_sub(1)
    }

    /// Day of week, 0 = Sunday through 6 = Saturday. 2000-01-01 was a Saturday.
    #[must_use]
    pub fn day_of_week(&self) -> u8 {
        ((self.days_since_2000() + 6) % 7) as u8
    }

    /// [`day_of_week`](Self::day_of_week) as a chrono [`Weekday`].
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        WEEKDAYS_FROM_SUNDAY[usize::from(self.day_of_week())]
    }

    /// Returns the instant `delta` seconds later.
    ///
    /// Saturates at 2099-12-31 23:59:59.
    #[must_use]
    pub fn add_seconds(self, delta: u32) -> Self {
        Self::from_epoch_seconds(self.to_epoch_seconds().saturating_add(delta))
    }

    /// Parses a compiler style build stamp: `date` as `"Dec 26 2009"` and
    /// `time` as `"12:34:56"`.
    ///
    /// Only this fixed layout is understood. A space in place of the first
    /// digit of a two digit token counts as 0. Returns `None` if either string
    /// is too short or the month abbreviation is unknown.
    #[must_use]
    pub fn from_build_stamp(date: &str, time: &str) -> Option<Self> {
        let date = date.as_bytes();
        let time = time.as_bytes();
        if date.len() < 11 || time.len() < 8 {
            return None;
        }

        let month = match (date[0], date[1], date[2]) {
            (b'J', b'a', _) => 1,
            (b'J', _, b'n') => 6,
            (b'J', _, _) => 7,
            (b'F', _, _) => 2,
            (b'A', _, b'r') => 4,
            (b'A', _, _) => 8,
            (b'M', _, b'r') => 3,
            (b'M', _, _) => 5,
            (b'S', _, _) => 9,
            (b'O', _, _) => 10,
            (b'N', _, _) => 11,
            (b'D', _, _) => 12,
            _ => return None,
        };

        let year = two_digits(&date[9..11])?;
        let day = two_digits(&date[4..6])?;
        let hour = two_digits(&time[0..2])?;
        let minute = two_digits(&time[3..5])?;
        let second = two_digits(&time[6..8])?;

        Some(Self::new(u16::from(year), month, day, hour, minute, second))
    }

    /// Converts to a chrono [`NaiveDateTime`], `None` if the fields do not
    /// form a real date (for example an alarm read-back with day 0).
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year()),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
    }

    /// Full year, 2000-2099.
    #[must_use]
    pub fn year(&self) -> u16 {
        2000 + u16::from(self.year_offset)
    }

    /// Year as an offset from 2000.
    #[must_use]
    pub fn year_offset(&self) -> u8 {
        self.year_offset
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub fn day(&self) -> u8 {
        self.day
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[must_use]
    pub fn second(&self) -> u8 {
        self.second
    }

    #[must_use]
    pub fn is_leap_year(&self) -> bool {
        self.year_offset % 4 == 0
    }
}

// "6" or " 6" style token, the second byte must be a digit
fn two_digits(token: &[u8]) -> Option<u8> {
    let tens = if token[0].is_ascii_digit() {
        token[0] - b'0'
    } else {
        0
    };
    if !token[1].is_ascii_digit() {
        return None;
    }
    Some(10 * tens + token[1] - b'0')
}

impl From<u32> for CivilDateTime {
    fn from(seconds: u32) -> Self {
        Self::from_epoch_seconds(seconds)
    }
}

impl From<CivilDateTime> for u32 {
    fn from(dt: CivilDateTime) -> Self {
        dt.to_epoch_seconds()
    }
}

impl From<&NaiveDateTime> for CivilDateTime {
    /// Years outside 2000-2099 saturate like any other out of range field.
    fn from(dt: &NaiveDateTime) -> Self {
        let year = u16::try_from(dt.year().clamp(2000, 2099)).unwrap_or(2000);
        Self::new(
            year,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
        )
    }
}

impl AddAssign<u32> for CivilDateTime {
    fn add_assign(&mut self, delta: u32) {
        *self = self.add_seconds(delta);
    }
}

impl fmt::Display for CivilDateTime {
    /// Formats as `DD-MM-YYYY hh:mm:ss`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:04} {:02}:{:02}:{:02}",
            self.day,
            self.month,
            self.year(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Raw contents of the 7 time registers starting at 0x00.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct DS3231DateTime {
    seconds: Seconds,
    minutes: u8,
    hours: Hours,
    day: u8,
    date: u8,
    month: Month,
    year: u8,
}

impl DS3231DateTime {
    /// Encodes `datetime` as BCD. The day of week register is always 0.
    pub(crate) fn from_datetime(datetime: &CivilDateTime) -> Self {
        let raw = DS3231DateTime {
            seconds: Seconds(to_bcd(datetime.second)),
            minutes: to_bcd(datetime.minute),
            hours: Hours(to_bcd(datetime.hour)),
            day: 0,
            date: to_bcd(datetime.day),
            month: Month(to_bcd(datetime.month)),
            year: to_bcd(datetime.year_offset),
        };
        debug!("raw={:?}", raw);
        raw
    }

    /// Decodes the registers assuming 24 hour mode.
    ///
    /// The clock halt bit, the 12/24 select bit and the century bit are not
    /// part of the BCD values and are dropped.
    pub(crate) fn into_datetime(self) -> CivilDateTime {
        CivilDateTime::new(
            2000 + u16::from(from_bcd(self.year)),
            from_bcd(self.month.bcd()),
            from_bcd(self.date),
            from_bcd(self.hours.bcd()),
            from_bcd(self.minutes),
            from_bcd(self.seconds.bcd()),
        )
    }
}

impl From<[u8; 7]> for DS3231DateTime {
    fn from(data: [u8; 7]) -> Self {
        DS3231DateTime {
            seconds: Seconds(data[0]),
            minutes: data[1],
            hours: Hours(data[2]),
            day: data[3],
            date: data[4],
            month: Month(data[5]),
            year: data[6],
        }
    }
}

impl From<&DS3231DateTime> for [u8; 7] {
    fn from(dt: &DS3231DateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes,
            dt.hours.0,
            dt.day,
            dt.date,
            dt.month.0,
            dt.year,
        ]
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;

    fn days_in(year_offset: u8, month: u8) -> u8 {
        let days = DAYS_IN_MONTH[usize::from(month - 1)];
        if month == 2 && year_offset % 4 == 0 {
            days + 1
        } else {
            days
        }
    }

    #[test]
    fn test_epoch_round_trip_every_day() {
        for year in 0..=99u8 {
            for month in 1..=12u8 {
                for day in 1..=days_in(year, month) {
                    let dt = CivilDateTime::new(u16::from(year), month, day, 23, 59, 59);
                    let back = CivilDateTime::from_epoch_seconds(dt.to_epoch_seconds());
                    assert_eq!(dt, back, "round trip failed for {}", dt);
                }
            }
        }
    }

    #[test]
    fn test_epoch_round_trip_time_of_day() {
        for hour in 0..24u8 {
            for minute in 0..60u8 {
                for second in [0u8, 1, 30, 59] {
                    let dt = CivilDateTime::new(2037, 7, 14, hour, minute, second);
                    assert_eq!(dt, CivilDateTime::from(u32::from(dt)));
                }
            }
        }
    }

    #[test]
    fn test_epoch_matches_chrono() {
        let samples = [
            CivilDateTime::new(2000, 1, 1, 0, 0, 0),
            CivilDateTime::new(2000, 2, 29, 12, 0, 0),
            CivilDateTime::new(2009, 12, 26, 12, 30, 45),
            CivilDateTime::new(2024, 3, 1, 0, 0, 1),
            CivilDateTime::new(2099, 12, 31, 23, 59, 59),
        ];
        for dt in samples {
            let naive = dt.to_naive().unwrap();
            assert_eq!(
                i64::from(dt.to_epoch_seconds()),
                naive.and_utc().timestamp(),
                "epoch mismatch for {}",
                dt
            );
        }
    }

    #[test]
    fn test_epoch_reference_points() {
        let start = CivilDateTime::new(2000, 1, 1, 0, 0, 0);
        assert_eq!(start.to_epoch_seconds(), SECONDS_FROM_1970_TO_2000);
        assert_eq!(
            CivilDateTime::from_epoch_seconds(SECONDS_FROM_1970_TO_2000),
            start
        );
        // 2009-12-26 12:30:45 UTC
        assert_eq!(
            CivilDateTime::new(2009, 12, 26, 12, 30, 45).to_epoch_seconds(),
            1_261_830_645
        );
    }

    #[test]
    fn test_before_2000_saturates() {
        let dt = CivilDateTime::from_epoch_seconds(0);
        assert_eq!(dt, CivilDateTime::new(2000, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_leap_day_2000() {
        let leap = CivilDateTime::new(2000, 2, 29, 0, 0, 0);
        assert!(leap.is_leap_year());
        let back = CivilDateTime::from_epoch_seconds(leap.to_epoch_seconds());
        assert_eq!(back, leap);
        assert_eq!(back.month(), 2);
        assert_eq!(back.day(), 29);

        let next = leap.add_seconds(SECONDS_PER_DAY);
        assert_eq!((next.month(), next.day()), (3, 1));
    }

    #[test]
    fn test_non_leap_year_rolls_to_march() {
        let feb28 = CivilDateTime::new(2001, 2, 28, 23, 59, 59);
        assert!(!feb28.is_leap_year());
        let next = feb28.add_seconds(1);
        assert_eq!(next, CivilDateTime::new(2001, 3, 1, 0, 0, 0));
    }

    #[test]
    fn test_day_of_week() {
        // 2000-01-01 was a Saturday
        let start = CivilDateTime::new(2000, 1, 1, 0, 0, 0);
        assert_eq!(start.day_of_week(), 6);
        assert_eq!(start.weekday(), Weekday::Sat);

        assert_eq!(CivilDateTime::new(2000, 1, 2, 0, 0, 0).day_of_week(), 0);
        // 2024-03-14 was a Thursday
        let dt = CivilDateTime::new(2024, 3, 14, 15, 30, 0);
        assert_eq!(dt.day_of_week(), 4);
        assert_eq!(dt.weekday(), Weekday::Thu);
    }

    #[test]
    fn test_day_of_week_matches_chrono() {
        let mut dt = CivilDateTime::new(2000, 1, 1, 12, 0, 0);
        for _ in 0..800 {
            let naive = dt.to_naive().unwrap();
            assert_eq!(dt.weekday(), naive.weekday(), "weekday mismatch for {}", dt);
            dt += 17 * SECONDS_PER_DAY;
        }
    }

    #[test]
    fn test_add_seconds() {
        let dt = CivilDateTime::new(2099, 12, 31, 23, 59, 59);
        let mut later = CivilDateTime::new(2023, 12, 31, 23, 59, 30);
        later += 45;
        assert_eq!(later, CivilDateTime::new(2024, 1, 1, 0, 0, 15));
        assert_eq!(dt.add_seconds(0), dt);
    }

    #[test]
    fn test_after_2099_saturates() {
        let last = CivilDateTime::new(2099, 12, 31, 23, 59, 59);
        assert_eq!(last.to_epoch_seconds(), 4_102_444_799);
        assert_eq!(CivilDateTime::from_epoch_seconds(4_102_444_800), last);
        assert_eq!(CivilDateTime::from_epoch_seconds(u32::MAX), last);
        assert_eq!(last.add_seconds(3600), last);

        let raw: [u8; 7] = (&DS3231DateTime::from_datetime(&last.add_seconds(u32::MAX))).into();
        assert_eq!(raw, [0x59, 0x59, 0x23, 0x00, 0x31, 0x12, 0x99]);
    }

    #[test]
    fn test_lenient_construction_clamps() {
        let dt = CivilDateTime::new(2000, 13, 40, 25, 70, 99);
        assert_eq!(dt.month(), 12);
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.minute(), 60);
        assert_eq!(dt.second(), 60);

        assert_eq!(CivilDateTime::new(2150, 1, 1, 0, 0, 0).year(), 2099);
        assert_eq!(CivilDateTime::new(24, 1, 1, 0, 0, 0).year(), 2024);
        assert_eq!(CivilDateTime::new(1999, 12, 31, 0, 0, 0).year(), 2000);
        assert_eq!(CivilDateTime::new(100, 1, 1, 0, 0, 0).year(), 2000);
        // lower bounds pass through
        assert_eq!(CivilDateTime::new(2000, 1, 0, 0, 0, 0).day(), 0);
    }

    #[test]
    fn test_display_format() {
        let dt = CivilDateTime::new(2009, 12, 26, 12, 30, 45);
        assert_eq!(alloc::format!("{}", dt), "26-12-2009 12:30:45");

        let dt = CivilDateTime::new(2001, 2, 3, 4, 5, 6);
        assert_eq!(alloc::format!("{}", dt), "03-02-2001 04:05:06");
    }

    #[test]
    fn test_from_build_stamp() {
        let dt = CivilDateTime::from_build_stamp("Dec 26 2009", "12:34:56").unwrap();
        assert_eq!(dt, CivilDateTime::new(2009, 12, 26, 12, 34, 56));

        let dt = CivilDateTime::from_build_stamp("Jun  6 2024", "01:02:03").unwrap();
        assert_eq!(dt, CivilDateTime::new(2024, 6, 6, 1, 2, 3));

        let months = [
            ("Jan", 1),
            ("Feb", 2),
            ("Mar", 3),
            ("Apr", 4),
            ("May", 5),
            ("Jun", 6),
            ("Jul", 7),
            ("Aug", 8),
            ("Sep", 9),
            ("Oct", 10),
            ("Nov", 11),
            ("Dec", 12),
        ];
        for (name, number) in months {
            let date = alloc::format!("{} 15 2020", name);
            let dt = CivilDateTime::from_build_stamp(&date, "00:00:00").unwrap();
            assert_eq!(dt.month(), number, "wrong month for {}", name);
        }
    }

    #[test]
    fn test_from_build_stamp_rejects_bad_input() {
        assert!(CivilDateTime::from_build_stamp("Dec 26", "12:34:56").is_none());
        assert!(CivilDateTime::from_build_stamp("Dec 26 2009", "12:34").is_none());
        assert!(CivilDateTime::from_build_stamp("Xyz 26 2009", "12:34:56").is_none());
        assert!(CivilDateTime::from_build_stamp("Dec 2x 2009", "12:34:56").is_none());
    }

    #[test]
    fn test_chrono_conversions() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let dt = CivilDateTime::from(&naive);
        assert_eq!(dt, CivilDateTime::new(2024, 3, 14, 15, 30, 0));
        assert_eq!(dt.to_naive(), Some(naive));

        // alarm 2 read-back style instant is not a real date
        assert_eq!(CivilDateTime::new(2000, 1, 0, 6, 30, 0).to_naive(), None);
    }

    #[test]
    fn test_raw_encoding() {
        let dt = CivilDateTime::new(2024, 3, 14, 15, 30, 0);
        let raw = DS3231DateTime::from_datetime(&dt);
        let bytes: [u8; 7] = (&raw).into();
        assert_eq!(bytes, [0x00, 0x30, 0x15, 0x00, 0x14, 0x03, 0x24]);
        assert_eq!(DS3231DateTime::from(bytes), raw);
        assert_eq!(raw.into_datetime(), dt);
    }

    #[test]
    fn test_raw_decoding_masks_flag_bits() {
        // clock halt bit on seconds, century bit on month
        let raw = DS3231DateTime::from([0xC5, 0x30, 0x12, 0x03, 0x26, 0x92, 0x09]);
        assert_eq!(
            raw.into_datetime(),
            CivilDateTime::new(2009, 12, 26, 12, 30, 45)
        );
    }
}
