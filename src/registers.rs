//! Register definitions and bitfield structures for the DS3231 RTC.
//!
//! This module contains the register address map, bitfield views of the
//! registers the driver interprets, and named bit constants for use with
//! [`DS3231::toggle_bit`](crate::DS3231::toggle_bit). Bit constants are
//! grouped per register: the same bit value means different things in
//! different registers (0x40 is BBSQW in the control register, the 12/24
//! select in the hours register and DY/DT in an alarm day/date register).

use bitfield::bitfield;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register, also the base of the 7 byte time block
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register, holds the 12/24 mode bit
    Hours = 0x02,
    /// Day of week register (unused by the driver, written as 0)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) with century bit
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register, base of the 4 byte alarm 1 block
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register, base of the 3 byte alarm 2 block
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB register
    MSBTemp = 0x11,
    /// Temperature LSB register
    LSBTemp = 0x12,
}

impl From<RegAddr> for u8 {
    fn from(v: RegAddr) -> Self {
        v as u8
    }
}

/// Control register (0x0E) bits.
pub struct ControlBits;

impl ControlBits {
    /// Enable oscillator (active low)
    pub const EOSC: u8 = 0b1000_0000;
    /// Battery-backed square-wave enable
    pub const BBSQW: u8 = 0b0100_0000;
    /// Convert temperature
    pub const CONV: u8 = 0b0010_0000;
    /// Rate select 2
    pub const RS2: u8 = 0b0001_0000;
    /// Rate select 1
    pub const RS1: u8 = 0b0000_1000;
    /// Interrupt control
    pub const INTCN: u8 = 0b0000_0100;
    /// Alarm 2 interrupt enable
    pub const A2IE: u8 = 0b0000_0010;
    /// Alarm 1 interrupt enable
    pub const A1IE: u8 = 0b0000_0001;
}

/// Square-wave rate select patterns within the control register (RS2:RS1).
pub struct SquareWaveBits;

impl SquareWaveBits {
    pub const HZ_1: u8 = 0;
    pub const HZ_1024: u8 = ControlBits::RS1;
    pub const HZ_4096: u8 = ControlBits::RS2;
    pub const HZ_8192: u8 = ControlBits::RS2 | ControlBits::RS1;
    /// Both rate select bits
    pub const MASK: u8 = ControlBits::RS2 | ControlBits::RS1;
}

/// Control/Status register (0x0F) bits.
pub struct StatusBits;

impl StatusBits {
    /// Oscillator stop flag
    pub const OSF: u8 = 0b1000_0000;
    /// Enable 32kHz output
    pub const EN32KHZ: u8 = 0b0000_1000;
    /// Busy
    pub const BSY: u8 = 0b0000_0100;
    /// Alarm 2 flag
    pub const A2F: u8 = 0b0000_0010;
    /// Alarm 1 flag
    pub const A1F: u8 = 0b0000_0001;
}

/// Seconds register (0x00) bits.
pub struct SecondBits;

impl SecondBits {
    /// Top bit of the seconds byte, never part of the BCD value
    pub const CLOCK_HALT: u8 = 0b1000_0000;
}

/// Hours register (0x02) bits.
pub struct HourBits;

impl HourBits {
    /// 12 hour mode when set
    pub const TWELVE_HOUR: u8 = 0b0100_0000;
    /// PM flag in 12 hour mode, 20-hour digit in 24 hour mode
    pub const PM: u8 = 0b0010_0000;
}

/// Alarm register (0x07-0x0D) bits.
pub struct AlarmBits;

impl AlarmBits {
    /// "Don't care" mask bit, present in every alarm byte
    pub const MASK: u8 = 0b1000_0000;
    /// DY/DT bit of the day/date byte: match day of week instead of date
    pub const DAY_SELECT: u8 = 0b0100_0000;
}

// Field enums convert from the raw field bits (panicking on a value outside
// the field) and back.
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl From<u8> for $name {
            /// # Panics
            /// Panics if `v` does not fit the field.
            fn from(v: u8) -> Self {
                match v {
                    $(x if x == $value => $name::$variant,)+
                    _ => panic!(concat!("Invalid value for ", stringify!($name), ": {}"), v),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> Self {
                v as u8
            }
        }
    };
}

field_enum! {
    /// 12/24 hour mode bit of the hours registers.
    TimeRepresentation {
        /// 24-hour format (0-23)
        TwentyFourHour = 0,
        /// 12-hour format (1-12 + AM/PM)
        TwelveHour = 1,
    }
}

field_enum! {
    /// EOSC bit. Active low: the oscillator runs on battery when enabled.
    Oscillator {
        Enabled = 0,
        Disabled = 1,
    }
}

field_enum! {
    /// INTCN bit, selects what drives the INT/SQW pin.
    InterruptControl {
        SquareWave = 0,
        /// Alarm interrupts
        Interrupt = 1,
    }
}

field_enum! {
    /// RS2:RS1 rate select bits.
    SquareWaveFrequency {
        Hz1 = 0b00,
        Hz1024 = 0b01,
        Hz4096 = 0b10,
        Hz8192 = 0b11,
    }
}

field_enum! {
    /// DY/DT bit of an alarm day/date register.
    DayDateSelect {
        /// Match against the date of the month (1-31)
        Date = 0,
        /// Match against the day of the week
        Day = 1,
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register. Bit 7 is not part of the value and is masked on read.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock halt bit
    pub clock_halt, set_clock_halt: 7;
    /// BCD seconds (0x00-0x59)
    pub bcd, set_bcd: 6, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Hours register with 12/24 mode selection.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Hours(u8);
    impl Debug;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// PM flag (12-hour) or 20-hour bit (24-hour)
    pub pm_or_twenty_hours, set_pm_or_twenty_hours: 5, 5;
    /// BCD hours including the 20-hour bit (24-hour mode)
    pub bcd, set_bcd: 5, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Month register with century flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Month(u8);
    impl Debug;
    /// Century flag, toggled by the chip when the year wraps from 99
    pub century, set_century: 7;
    /// BCD month (0x01-0x12)
    pub bcd, set_bcd: 4, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Control register (0x0E).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator enable/disable control
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// Enable square wave output on battery power
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output frequency selection
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INT/SQW pin function control
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

bitfield! {
    /// Status register for device state and flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Device busy flag
    pub busy, set_busy: 2;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Aging offset register for oscillator adjustment.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Aging offset value (-128 to +127)
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature register (integer part, two's complement).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Temperature(u8);
    impl Debug;
    pub i8, temperature, set_temperature: 7, 0;
}
from_register_u8!(Temperature);

bitfield! {
    /// Temperature fraction register, 1/256 °C units with 0.25 °C resolution.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct TemperatureFraction(u8);
    impl Debug;
    /// Whole byte, 1/256 °C per count
    pub fraction, set_fraction: 7, 0;
    /// Quarter degrees (0-3)
    pub quarters, set_quarters: 7, 6;
}
from_register_u8!(TemperatureFraction);

// Alarm register types with mask bits

bitfield! {
    /// Alarm 1 seconds register.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit (A1M1)
    pub alarm_mask, set_alarm_mask: 7;
    /// BCD seconds
    pub bcd, set_bcd: 6, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm minutes register (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit (A1M2/A2M2)
    pub alarm_mask, set_alarm_mask: 7;
    /// BCD minutes
    pub bcd, set_bcd: 6, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm hours register (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit (A1M3/A2M3)
    pub alarm_mask, set_alarm_mask: 7;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 6, 6;
    /// BCD hours (24-hour mode)
    pub bcd, set_bcd: 5, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm day/date register (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit (A1M4/A2M4)
    pub alarm_mask, set_alarm_mask: 7;
    /// Day/Date select (DY/DT)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// BCD day of week or date of month
    pub bcd, set_bcd: 5, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_addresses() {
        assert_eq!(u8::from(RegAddr::Seconds), 0x00);
        assert_eq!(u8::from(RegAddr::Hours), 0x02);
        assert_eq!(u8::from(RegAddr::Alarm1Seconds), 0x07);
        assert_eq!(u8::from(RegAddr::Alarm2Minutes), 0x0B);
        assert_eq!(u8::from(RegAddr::Control), 0x0E);
        assert_eq!(u8::from(RegAddr::ControlStatus), 0x0F);
        assert_eq!(u8::from(RegAddr::AgingOffset), 0x10);
        assert_eq!(u8::from(RegAddr::MSBTemp), 0x11);
        assert_eq!(u8::from(RegAddr::LSBTemp), 0x12);
    }

    #[test]
    fn test_control_bit_values() {
        assert_eq!(ControlBits::EOSC, 128);
        assert_eq!(ControlBits::BBSQW, 64);
        assert_eq!(ControlBits::CONV, 32);
        assert_eq!(ControlBits::RS2, 16);
        assert_eq!(ControlBits::RS1, 8);
        assert_eq!(ControlBits::INTCN, 4);
        assert_eq!(ControlBits::A2IE, 2);
        assert_eq!(ControlBits::A1IE, 1);

        assert_eq!(SquareWaveBits::HZ_1, 0);
        assert_eq!(SquareWaveBits::HZ_1024, 8);
        assert_eq!(SquareWaveBits::HZ_4096, 16);
        assert_eq!(SquareWaveBits::HZ_8192, 24);
    }

    #[test]
    fn test_bitfields_agree_with_bit_constants() {
        let mut control = Control::default();
        control.set_alarm1_interrupt_enable(true);
        assert_eq!(u8::from(control), ControlBits::A1IE);
        control.set_alarm2_interrupt_enable(true);
        control.set_interrupt_control(InterruptControl::Interrupt);
        assert_eq!(
            u8::from(control),
            ControlBits::A1IE | ControlBits::A2IE | ControlBits::INTCN
        );

        let mut control = Control::default();
        control.set_square_wave_frequency(SquareWaveFrequency::Hz4096);
        assert_eq!(u8::from(control), SquareWaveBits::HZ_4096);
        control.set_oscillator_enable(Oscillator::Disabled);
        assert_eq!(u8::from(control) & ControlBits::EOSC, ControlBits::EOSC);

        let mut hours = Hours::default();
        hours.set_time_representation(TimeRepresentation::TwelveHour);
        assert_eq!(u8::from(hours), HourBits::TWELVE_HOUR);

        let mut day_date = AlarmDayDate::default();
        day_date.set_day_date_select(DayDateSelect::Day);
        assert_eq!(u8::from(day_date), AlarmBits::DAY_SELECT);
        day_date.set_alarm_mask(true);
        assert_eq!(
            u8::from(day_date),
            AlarmBits::DAY_SELECT | AlarmBits::MASK
        );
    }

    #[test]
    fn test_seconds_clock_halt_is_separate_from_value() {
        let seconds = Seconds::from(0xC5);
        assert!(seconds.clock_halt());
        assert_eq!(seconds.bcd(), 0x45);
        assert_eq!(u8::from(seconds), 0xC5);
    }

    #[test]
    fn test_alarm_registers_strip_flags() {
        let minutes = AlarmMinutes::from(0x80 | 0x30);
        assert!(minutes.alarm_mask());
        assert_eq!(minutes.bcd(), 0x30);

        let hours = AlarmHours::from(0x80 | 0x23);
        assert!(hours.alarm_mask());
        assert_eq!(hours.bcd(), 0x23);
        assert_eq!(
            hours.time_representation(),
            TimeRepresentation::TwentyFourHour
        );

        let day_date = AlarmDayDate::from(0x40 | 0x05);
        assert!(!day_date.alarm_mask());
        assert_eq!(day_date.day_date_select(), DayDateSelect::Day);
        assert_eq!(day_date.bcd(), 0x05);
    }

    #[test]
    fn test_status_register_conversions() {
        let status = Status::from(StatusBits::OSF | StatusBits::A2F);
        assert!(status.oscillator_stop_flag());
        assert!(status.alarm2_flag());
        assert!(!status.alarm1_flag());
        assert!(!status.busy());
        assert!(!status.enable_32khz_output());
    }

    #[test]
    fn test_temperature_register_conversions() {
        assert_eq!(Temperature::from(0x18).temperature(), 24);
        assert_eq!(Temperature::from(0xFE).temperature(), -2);

        let frac = TemperatureFraction::from(0xC0);
        assert_eq!(frac.fraction(), 0xC0);
        assert_eq!(frac.quarters(), 3);
    }

    #[test]
    fn test_aging_offset_is_signed() {
        let mut aging = AgingOffset::default();
        aging.set_aging_offset(-5);
        assert_eq!(u8::from(aging), 0xFB);
        assert_eq!(AgingOffset::from(0x7F).aging_offset(), 127);
    }

    #[test]
    fn test_enum_conversions() {
        assert_eq!(DayDateSelect::from(1), DayDateSelect::Day);
        assert_eq!(u8::from(DayDateSelect::Date), 0);
        assert_eq!(Oscillator::from(1), Oscillator::Disabled);
        assert_eq!(u8::from(SquareWaveFrequency::Hz8192), 0b11);
        assert_eq!(InterruptControl::from(0), InterruptControl::SquareWave);
    }

    #[test]
    #[should_panic(expected = "Invalid value for DayDateSelect: 2")]
    fn test_invalid_day_date_select_conversion() {
        let _ = DayDateSelect::from(2);
    }

    #[test]
    #[should_panic(expected = "Invalid value for SquareWaveFrequency: 4")]
    fn test_invalid_square_wave_frequency_conversion() {
        let _ = SquareWaveFrequency::from(4);
    }
}
