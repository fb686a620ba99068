//! Async implementation of the DS3231 driver.
//!
//! Mirrors [`crate::DS3231`] on top of the `embedded-hal-async` I²C trait.
//! Register transactions, encodings and errors are identical to the blocking
//! driver. Only available with the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::{asynch::DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.initialize().await?;
//! let now = rtc.now().await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::{
    alarm::{DS3231Alarm1, DS3231Alarm2},
    datetime::DS3231DateTime,
    AgingOffset, Alarm1Granularity, Alarm2Granularity, AlarmSpec, CivilDateTime, Config, Control,
    ControlBits, DS3231Error, Hours, RegAddr, Status, Temperature, TemperatureFraction,
};

/// DS3231 Real-Time Clock async driver.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new async driver for the device at `address`.
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

    /// Checks that the device answers at its address by reading the status
    /// register.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if the device does not respond.
    pub async fn initialize(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: probing address {:#x}", self.address);
        self.read_register(RegAddr::ControlStatus).await?;
        Ok(())
    }

    /// Applies `config` to the control register.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: reading control register");
        let mut control = self.control().await?;
        config.apply(&mut control);
        debug!("DS3231: writing control: {:?}", control);
        self.set_control(control).await
    }

    async fn read_block(
        &mut self,
        start: RegAddr,
        data: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start as u8], data)
            .await?;
        trace!("DS3231: read {:?} from {:?}", data, start);
        Ok(())
    }

    /// Reads the current date and time.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn now(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_block(RegAddr::Seconds, &mut data).await?;
        Ok(DS3231DateTime::from(data).into_datetime())
    }

    /// Sets the current date and time.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn set_datetime(
        &mut self,
        datetime: &CivilDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 7] = (&DS3231DateTime::from_datetime(datetime)).into();
        self.i2c
            .write(
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
            )
            .await?;
        Ok(())
    }

    /// Reads the alarm 1 time (year 2000, January).
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn alarm1(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::Alarm1Seconds, &mut data).await?;
        Ok(DS3231Alarm1::from(data).into_datetime())
    }

    /// Reads the alarm 2 time (year 2000, January, day 0, second 0).
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn alarm2(&mut self) -> Result<CivilDateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_block(RegAddr::Alarm2Minutes, &mut data).await?;
        Ok(DS3231Alarm2::from(data).into_datetime())
    }

    /// Programs alarm 1 and then switches its interrupt enable bit.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn set_alarm1(
        &mut self,
        time: &CivilDateTime,
        enabled: bool,
        granularity: Alarm1Granularity,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 4] = (&DS3231Alarm1::from_datetime(time, granularity)).into();
        self.i2c
            .write(
                self.address,
                &[
                    RegAddr::Alarm1Seconds as u8,
                    data[0],
                    data[1],
                    data[2],
                    data[3],
                ],
            )
            .await?;
        self.toggle_bit(RegAddr::Control, ControlBits::A1IE, enabled)
            .await?;
        Ok(())
    }

    /// Programs alarm 2 and then switches its interrupt enable bit.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn set_alarm2(
        &mut self,
        time: &CivilDateTime,
        enabled: bool,
        granularity: Alarm2Granularity,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data: [u8; 3] = (&DS3231Alarm2::from_datetime(time, granularity)).into();
        self.i2c
            .write(
                self.address,
                &[RegAddr::Alarm2Minutes as u8, data[0], data[1], data[2]],
            )
            .await?;
        self.toggle_bit(RegAddr::Control, ControlBits::A2IE, enabled)
            .await?;
        Ok(())
    }

    /// Reads back the full alarm 1 setup, `None` for undefined mask patterns.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn alarm1_spec(
        &mut self,
    ) -> Result<Option<AlarmSpec<Alarm1Granularity>>, DS3231Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::Alarm1Seconds, &mut data).await?;
        let control = self.control().await?;
        Ok(DS3231Alarm1::from(data).into_spec(control.alarm1_interrupt_enable()))
    }

    /// Reads back the full alarm 2 setup, `None` for undefined mask patterns.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn alarm2_spec(
        &mut self,
    ) -> Result<Option<AlarmSpec<Alarm2Granularity>>, DS3231Error<I2C::Error>> {
        let mut data = [0; 3];
        self.read_block(RegAddr::Alarm2Minutes, &mut data).await?;
        let control = self.control().await?;
        Ok(DS3231Alarm2::from(data).into_spec(control.alarm2_interrupt_enable()))
    }

    /// Reads a single register.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn read_register(
        &mut self,
        reg: impl Into<u8>,
    ) -> Result<u8, DS3231Error<I2C::Error>> {
        let reg = reg.into();
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg], &mut data).await?;
        trace!("DS3231: read {:#x} from {:#x}", data[0], reg);
        Ok(data[0])
    }

    /// Writes a single register.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn write_register(
        &mut self,
        reg: impl Into<u8>,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let reg = reg.into();
        trace!("DS3231: write {:#x} to {:#x}", value, reg);
        self.i2c.write(self.address, &[reg, value]).await?;
        Ok(())
    }

    /// Sets (`on`) or clears the `mask` bits of a register and returns the
    /// value read back afterwards.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` if any of the three transfers fails.
    pub async fn toggle_bit(
        &mut self,
        reg: impl Into<u8>,
        mask: u8,
        on: bool,
    ) -> Result<u8, DS3231Error<I2C::Error>> {
        let reg = reg.into();
        let value = self.read_register(reg).await?;
        let value = if on { value | mask } else { value & !mask };
        self.write_register(reg, value).await?;
        self.read_register(reg).await
    }

    /// Reads the temperature in °C.
    ///
    /// # Errors
    /// Returns `DS3231Error::I2c` on bus failure.
    pub async fn temperature(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        let msb = Temperature(self.read_register(RegAddr::MSBTemp).await?);
        let lsb = TemperatureFraction(self.read_register(RegAddr::LSBTemp).await?);
        Ok(f32::from(msb.temperature()) + f32::from(lsb.fraction()) / 256.0)
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        Ok($typ(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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
