//! # DS3231 Real-Time Clock Driver
//!
//! A platform-agnostic driver for the DS3231 real-time clock, built on the
//! `embedded-hal` I²C traits, together with [`CivilDateTime`], a small
//! calendar type for 2000-2099 with epoch-second arithmetic.
//!
//! ## Features
//!
//! - Read and set the current date and time
//! - Both hardware alarms with configurable match granularity
//! - Raw register read/write and single bit read-modify-write
//! - Temperature readout
//! - Optional async driver (`async` feature)
//! - Optional logging through `log` or `defmt`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ds3231_rtc::{Alarm1Granularity, CivilDateTime, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.initialize()?;
//! rtc.set_datetime(&CivilDateTime::new(2024, 3, 14, 15, 30, 0))?;
//!
//! let now = rtc.now()?;
//! rtc.set_alarm1(&now.add_seconds(60), true, Alarm1Granularity::HoursMinsSecsMatch)?;
//! let celsius = rtc.temperature()?;
//! ```
//!
//! ## Bus access
//!
//! The driver owns its bus handle and every operation takes `&mut self`.
//! A register transaction is a strict request then response sequence, so
//! sharing one bus between several drivers has to go through a bus sharing
//! wrapper that serializes whole transactions.
//!
//! ## Error handling
//!
//! The only failure source is the bus: every operation returns
//! [`DS3231Error::I2c`] with the underlying error. Nothing is retried and a
//! failed multi-byte write leaves the registers in an unspecified state.
//! Out of range calendar fields never fail, see [`CivilDateTime::new`].

#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod datetime;
pub mod registers;

use embedded_hal::i2c::I2c;
use paste::paste;

pub use crate::alarm::{Alarm1Granularity, Alarm2Granularity, AlarmSpec};
use crate::alarm::{DS3231Alarm1, DS3231Alarm2};
pub use crate::datetime::CivilDateTime;
use crate::datetime::DS3231DateTime;
pub use crate::registers::*;

/// Fixed I²C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Configuration applied to the control register by `configure`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub square_wave_frequency: SquareWaveFrequency,
    pub interrupt_control: InterruptControl,
    pub battery_backed_square_wave: bool,
    pub oscillator_enable: Oscillator,
}

impl Default for Config {
    /// Power-on defaults of the chip except that the INT/SQW pin is used for
    /// alarm interrupts.
    fn default() -> Self {
        Self {
            square_wave_frequency: SquareWaveFrequency::Hz8192,
            interrupt_control: InterruptControl::Interrupt,
            battery_backed_square_wave: false,
            oscillator_enable: Oscillator::Enabled,
        }
    }
}

impl Config {
    pub(crate) fn apply(&self, control: &mut Control) {
        control.set_oscillator_enable(self.oscillator_enable);
        control.set_battery_backed_square_wave(self.battery_backed_square_wave);
        control.set_square_wave_frequency(self.square_wave_frequency);
        control.set_interrupt_control(self.interrupt_control);
    }
}

/// Errors reported by the driver.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// The I²C transfer failed (no acknowledge, arbitration loss, bus error...)
    I2c(I2CE),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

/// DS3231 Real-Time Clock driver.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new driver for the device at `address` (normally [`DEFAULT_ADDRESS`]).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Destroys the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// The I²C address this driver talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Checks that the device answers at its address.
    ///
    /// Reads the status register once and changes nothing, so calling it
    /// more than once is harmless.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if the device does not respond.
    pub fn initialize(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: probing address {:#x}", self.address);
        self.read_register(RegAddr::ControlStatus)?;
        Ok(())
    }

    /// Applies `config` to the control register, leaving the alarm enable and
    /// temperature conversion bits untouched.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control()?;
        config.apply(&mut control);
        debug!("DS3231: writing control: {:?}", control);
        self.set_control(control)
    }

    fn read_block(&mut self, start: RegAddr, data: &mut [u8]) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[start as u8], data)?;
        trace!("DS3231: read {:?} from {:?}", data, start);
        Ok(())
    }

    /// Reads the current date and time.
    ///
    /// The clock halt bit and the (unused) day of week register are ignored,
    /// and the hours register is expected to be in 24 hour mode.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure; no partial value is returned.
    pub fn now(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_block(RegAddr::Seconds, &mut data)?;
        Ok(DS3231DateTime::from(data).into_datetime())
    }

    /// Sets the current date and time. The day of week register is written as 0.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn set_datetime(&mut self, datetime: &CivilDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 7] = (&DS3231DateTime::from_datetime(datetime)).into();
        self.i2c.write(
            self.address,
            &[
                RegAddr::Seconds as u8,
                data[0],
                data[1],
                data[2],
                data[3],
                data[4],
                data[5],
                data[6],
            ],
        )?;
        Ok(())
    }

    /// Reads the alarm 1 time.
    ///
    /// Only day, hour, minute and second are meaningful; year and month are
    /// always 2000 and January.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn alarm1(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::Alarm1Seconds, &mut data)?;
        Ok(DS3231Alarm1::from(data).into_datetime())
    }

    /// Reads the alarm 2 time.
    ///
    /// Only hour and minute are meaningful; the result has year 2000,
    /// January, day 0 and second 0.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn alarm2(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_block(RegAddr::Alarm2Minutes, &mut data)?;
        Ok(DS3231Alarm2::from(data).into_datetime())
    }

    /// Programs alarm 1 and then switches its interrupt enable bit.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn set_alarm1(
        &mut self,
        time: &CivilDateTime,
        enabled: bool,
        granularity: Alarm1Granularity,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 4] = (&DS3231Alarm1::from_datetime(time, granularity)).into();
        self.i2c.write(
            self.address,
            &[
                RegAddr::Alarm1Seconds as u8,
                data[0],
                data[1],
                data[2],
                data[3],
            ],
        )?;
        self.toggle_bit(RegAddr::Control, ControlBits::A1IE, enabled)?;
        Ok(())
    }

    /// Programs alarm 2 and then switches its interrupt enable bit.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn set_alarm2(
        &mut self,
        time: &CivilDateTime,
        enabled: bool,
        granularity: Alarm2Granularity,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 3] = (&DS3231Alarm2::from_datetime(time, granularity)).into();
        self.i2c.write(
            self.address,
            &[RegAddr::Alarm2Minutes as u8, data[0], data[1], data[2]],
        )?;
        self.toggle_bit(RegAddr::Control, ControlBits::A2IE, enabled)?;
        Ok(())
    }

    /// Reads back the full alarm 1 setup including its interrupt enable bit.
    ///
    /// Returns `Ok(None)` if the mask bits form a combination the chip does
    /// not define (only possible after raw register writes).
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn alarm1_spec(
        &mut self,
    ) -> Result<Option<AlarmSpec<Alarm1Granularity>>, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::Alarm1Seconds, &mut data)?;
        let control = self.control()?;
        Ok(DS3231Alarm1::from(data).into_spec(control.alarm1_interrupt_enable()))
    }

    /// Reads back the full alarm 2 setup including its interrupt enable bit.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn alarm2_spec(
        &mut self,
    ) -> Result<Option<AlarmSpec<Alarm2Granularity>>, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_block(RegAddr::Alarm2Minutes, &mut data)?;
        let control = self.control()?;
        Ok(DS3231Alarm2::from(data).into_spec(control.alarm2_interrupt_enable()))
    }

    /// Reads a single register.
    ///
    /// Registers 0x00-0x0D hold BCD values, see [`bcd`].
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn read_register(&mut self, reg: impl Into<u8>) -> Result<u8, DS3231Error<I2C::Error>> {
        let reg = reg.into();
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg], &mut data)?;
        trace!("DS3231: read {:#x} from {:#x}", data[0], reg);
        Ok(data[0])
    }

    /// Writes a single register.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn write_register(
        &mut self,
        reg: impl Into<u8>,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let reg = reg.into();
        trace!("DS3231: write {:#x} to {:#x}", value, reg);
        self.i2c.write(self.address, &[reg, value])?;
        Ok(())
    }

    /// Sets (`on`) or clears the `mask` bits of a register.
    ///
    /// Returns the register as read back from the device after the write.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if any of the three transfers fails.
    pub fn toggle_bit(
        &mut self,
        reg: impl Into<u8>,
        mask: u8,
        on: bool,
    ) -> Result<u8, DS3231Error<I2C::Error>> {
        let reg = reg.into();
        let value = self.read_register(reg)?;
        let value = if on { value | mask } else { value & !mask };
        self.write_register(reg, value)?;
        self.read_register(reg)
    }

    /// Reads the temperature in °C (0.25 °C resolution).
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub fn temperature(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        let msb = Temperature(self.read_register(RegAddr::MSBTemp)?);
        let lsb = TemperatureFraction(self.read_register(RegAddr::LSBTemp)?);
        Ok(f32::from(msb.temperature()) + f32::from(lsb.fraction()) / 256.0)
    }
}

// Typed single register access
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Errors"]
                    #[doc = "Returns `DS3231Error::I2c` on bus failure."]
                    pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        Ok($typ(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Errors"]
                    #[doc = "Returns `DS3231Error::I2c` on bus failure."]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (hours_register, RegAddr::Hours, Hours),
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status),
    (aging_offset, RegAddr::AgingOffset, AgingOffset)
);
