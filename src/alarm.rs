//! Alarm register encoding for the DS3231 RTC.
//!
//! Each alarm is described by a target time and a granularity. The
//! granularity decides which alarm bytes get the "don't care" mask bit
//! (bit 7) ORed on top of their BCD value, and whether the day/date byte
//! matches the day of week (DY/DT bit 6 set) or the date of the month.
//!
//! # Alarm 1 (seconds precision)
//!
//! | Granularity              | sec | min | hour | day | DY/DT |
//! |--------------------------|-----|-----|------|-----|-------|
//! | `EverySecond`            |  x  |  x  |  x   |  x  | date  |
//! | `SecsMatch`              |     |  x  |  x   |  x  | date  |
//! | `MinsSecsMatch`          |     |     |  x   |  x  | date  |
//! | `HoursMinsSecsMatch`     |     |     |      |  x  | date  |
//! | `DateHoursMinsSecsMatch` |     |     |      |     | date  |
//! | `DayHoursMinsSecsMatch`  |     |     |      |     | day   |
//!
//! # Alarm 2 (minute precision, fires at 00 seconds)
//!
//! Same table without the seconds column: `EveryMinute`, `MinsMatch`,
//! `HoursMinsMatch`, `DateHoursMinsMatch`, `DayHoursMinsMatch`.

use crate::{
    bcd::{from_bcd, to_bcd},
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, CivilDateTime, DayDateSelect,
};

/// Which fields must match for alarm 1 to fire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm1Granularity {
    /// Once per second
    EverySecond,
    /// When seconds match
    SecsMatch,
    /// When minutes and seconds match
    MinsSecsMatch,
    /// When hours, minutes and seconds match (daily)
    #[default]
    HoursMinsSecsMatch,
    /// When date of month, hours, minutes and seconds match
    DateHoursMinsSecsMatch,
    /// When day of week, hours, minutes and seconds match
    DayHoursMinsSecsMatch,
}

impl Alarm1Granularity {
    /// Mask bits for (seconds, minutes, hours, day/date).
    const fn masks(self) -> (bool, bool, bool, bool) {
        match self {
            Alarm1Granularity::EverySecond => (true, true, true, true),
            Alarm1Granularity::SecsMatch => (false, true, true, true),
            Alarm1Granularity::MinsSecsMatch => (false, false, true, true),
            Alarm1Granularity::HoursMinsSecsMatch => (false, false, false, true),
            Alarm1Granularity::DateHoursMinsSecsMatch
            | Alarm1Granularity::DayHoursMinsSecsMatch => (false, false, false, false),
        }
    }

    const fn day_date_select(self) -> DayDateSelect {
        match self {
            Alarm1Granularity::DayHoursMinsSecsMatch => DayDateSelect::Day,
            _ => DayDateSelect::Date,
        }
    }
}

/// Which fields must match for alarm 2 to fire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm2Granularity {
    /// Once per minute
    EveryMinute,
    /// When minutes match
    MinsMatch,
    /// When hours and minutes match (daily)
    #[default]
    HoursMinsMatch,
    /// When date of month, hours and minutes match
    DateHoursMinsMatch,
    /// When day of week, hours and minutes match
    DayHoursMinsMatch,
}

impl Alarm2Granularity {
    /// Mask bits for (minutes, hours, day/date).
    const fn masks(self) -> (bool, bool, bool) {
        match self {
            Alarm2Granularity::EveryMinute => (true, true, true),
            Alarm2Granularity::MinsMatch => (false, true, true),
            Alarm2Granularity::HoursMinsMatch => (false, false, true),
            Alarm2Granularity::DateHoursMinsMatch | Alarm2Granularity::DayHoursMinsMatch => {
                (false, false, false)
            }
        }
    }

    const fn day_date_select(self) -> DayDateSelect {
        match self {
            Alarm2Granularity::DayHoursMinsMatch => DayDateSelect::Day,
            _ => DayDateSelect::Date,
        }
    }
}

/// An alarm as stored in the chip: target time, granularity and whether its
/// interrupt is enabled in the control register.
///
/// Only the day, hour, minute and (alarm 1) second of `time` are meaningful;
/// year and month are always 2000 and January.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSpec<G> {
    pub time: CivilDateTime,
    pub granularity: G,
    pub enabled: bool,
}

/// Alarm 1 registers (0x07-0x0A).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct DS3231Alarm1 {
    seconds: AlarmSeconds,
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm1 {
    pub(crate) fn from_datetime(time: &CivilDateTime, granularity: Alarm1Granularity) -> Self {
        let (mask_seconds, mask_minutes, mask_hours, mask_day) = granularity.masks();

        let mut seconds = AlarmSeconds(to_bcd(time.second()));
        seconds.set_alarm_mask(mask_seconds);
        let mut minutes = AlarmMinutes(to_bcd(time.minute()));
        minutes.set_alarm_mask(mask_minutes);
        let mut hours = AlarmHours(to_bcd(time.hour()));
        hours.set_alarm_mask(mask_hours);
        let mut day_date = AlarmDayDate(to_bcd(time.day()));
        day_date.set_day_date_select(granularity.day_date_select());
        day_date.set_alarm_mask(mask_day);

        let alarm = Self {
            seconds,
            minutes,
            hours,
            day_date,
        };
        debug!("alarm1={:?}", alarm);
        alarm
    }

    /// Partial instant: year 2000, January, decoded day/hour/minute/second.
    pub(crate) fn into_datetime(self) -> CivilDateTime {
        CivilDateTime::new(
            2000,
            1,
            from_bcd(self.day_date.bcd()),
            from_bcd(self.hours.bcd()),
            from_bcd(self.minutes.bcd()),
            from_bcd(self.seconds.bcd()),
        )
    }

    /// `None` when the mask bits form a pattern the chip does not define.
    pub(crate) fn granularity(&self) -> Option<Alarm1Granularity> {
        match (
            self.seconds.alarm_mask(),
            self.minutes.alarm_mask(),
            self.hours.alarm_mask(),
            self.day_date.alarm_mask(),
        ) {
            (true, true, true, true) => Some(Alarm1Granularity::EverySecond),
            (false, true, true, true) => Some(Alarm1Granularity::SecsMatch),
            (false, false, true, true) => Some(Alarm1Granularity::MinsSecsMatch),
            (false, false, false, true) => Some(Alarm1Granularity::HoursMinsSecsMatch),
            (false, false, false, false) => match self.day_date.day_date_select() {
                DayDateSelect::Date => Some(Alarm1Granularity::DateHoursMinsSecsMatch),
                DayDateSelect::Day => Some(Alarm1Granularity::DayHoursMinsSecsMatch),
            },
            _ => None,
        }
    }

    pub(crate) fn into_spec(self, enabled: bool) -> Option<AlarmSpec<Alarm1Granularity>> {
        let granularity = self.granularity()?;
        Some(AlarmSpec {
            time: self.into_datetime(),
            granularity,
            enabled,
        })
    }
}

impl From<[u8; 4]> for DS3231Alarm1 {
    fn from(data: [u8; 4]) -> Self {
        Self {
            seconds: AlarmSeconds(data[0]),
            minutes: AlarmMinutes(data[1]),
            hours: AlarmHours(data[2]),
            day_date: AlarmDayDate(data[3]),
        }
    }
}

impl From<&DS3231Alarm1> for [u8; 4] {
    fn from(alarm: &DS3231Alarm1) -> [u8; 4] {
        [
            alarm.seconds.0,
            alarm.minutes.0,
            alarm.hours.0,
            alarm.day_date.0,
        ]
    }
}

/// Alarm 2 registers (0x0B-0x0D).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) struct DS3231Alarm2 {
    minutes: AlarmMinutes,
    hours: AlarmHours,
    day_date: AlarmDayDate,
}

impl DS3231Alarm2 {
    pub(crate) fn from_datetime(time: &CivilDateTime, granularity: Alarm2Granularity) -> Self {
        let (mask_minutes, mask_hours, mask_day) = granularity.masks();

        let mut minutes = AlarmMinutes(to_bcd(time.minute()));
        minutes.set_alarm_mask(mask_minutes);
        let mut hours = AlarmHours(to_bcd(time.hour()));
        hours.set_alarm_mask(mask_hours);
        let mut day_date = AlarmDayDate(to_bcd(time.day()));
        day_date.set_day_date_select(granularity.day_date_select());
        day_date.set_alarm_mask(mask_day);

        let alarm = Self {
            minutes,
            hours,
            day_date,
        };
        debug!("alarm2={:?}", alarm);
        alarm
    }

    /// Partial instant: year 2000, January, day 0, second 0.
    ///
    /// The day/date byte is not carried over.
    pub(crate) fn into_datetime(self) -> CivilDateTime {
        CivilDateTime::new(
            2000,
            1,
            0,
            from_bcd(self.hours.bcd()),
            from_bcd(self.minutes.bcd()),
            0,
        )
    }

    pub(crate) fn granularity(&self) -> Option<Alarm2Granularity> {
        match (
            self.minutes.alarm_mask(),
            self.hours.alarm_mask(),
            self.day_date.alarm_mask(),
        ) {
            (true, true, true) => Some(Alarm2Granularity::EveryMinute),
            (false, true, true) => Some(Alarm2Granularity::MinsMatch),
            (false, false, true) => Some(Alarm2Granularity::HoursMinsMatch),
            (false, false, false) => match self.day_date.day_date_select() {
                DayDateSelect::Date => Some(Alarm2Granularity::DateHoursMinsMatch),
                DayDateSelect::Day => Some(Alarm2Granularity::DayHoursMinsMatch),
            },
            _ => None,
        }
    }

    /// Unlike [`into_datetime`](Self::into_datetime) this keeps the
    /// decoded day/date.
    pub(crate) fn into_spec(self, enabled: bool) -> Option<AlarmSpec<Alarm2Granularity>> {
        let granularity = self.granularity()?;
        Some(AlarmSpec {
            time: CivilDateTime::new(
                2000,
                1,
                from_bcd(self.day_date.bcd()),
                from_bcd(self.hours.bcd()),
                from_bcd(self.minutes.bcd()),
                0,
            ),
            granularity,
            enabled,
        })
    }
}

impl From<[u8; 3]> for DS3231Alarm2 {
    fn from(data: [u8; 3]) -> Self {
        Self {
            minutes: AlarmMinutes(data[0]),
            hours: AlarmHours(data[1]),
            day_date: AlarmDayDate(data[2]),
        }
    }
}

impl From<&DS3231Alarm2> for [u8; 3] {
    fn from(alarm: &DS3231Alarm2) -> [u8; 3] {
        [alarm.minutes.0, alarm.hours.0, alarm.day_date.0]
    }
}
