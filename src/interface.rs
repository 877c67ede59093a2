use embedded_hal::i2c;

use crate::Error;

/// Largest payload of a single register write: the whole PWM region of one frame.
const MAX_WRITE_LEN: usize = crate::NUM_PIXELS as usize;

/// Trait for giving read and write access to registers of the currently selected bank
pub trait RegisterAccess {
    type Error;

    /// Checks that a device acknowledges its address.
    fn probe(&mut self) -> Result<(), Self::Error>;

    /// Requests a bus clock of `frequency_hz`. Transports with a fixed clock ignore this.
    fn set_speed(&mut self, frequency_hz: u32) -> Result<(), Self::Error> {
        let _ = frequency_hz;
        Ok(())
    }

    /// Reads `data.len()` values, starting from `start_register`. The register offset
    /// is written first, followed by a read in the same transaction.
    fn read_registers(&mut self, start_register: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes to multiple registers in a single transaction, starting from `start_register`
    /// and relying on the chip's address auto increment for every element in `data`.
    fn write_registers(&mut self, start_register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads a single value from `register`. Returns `0xFF` if the transport
    /// completes without delivering any data.
    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buffer: [u8; 1] = [0xFF; 1];
        self.read_registers(register, &mut buffer)?;

        Ok(buffer[0])
    }

    /// Writes a single value to `register`.
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write_registers(register, &[value])
    }
}

pub struct I2cInterface<I2C> {
    pub(crate) i2c: I2C,
    pub(crate) address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// `address` is the 7bit i2c address, see [`crate::DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }
}

impl<I2C: i2c::I2c> I2cInterface<I2C> {
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, IE> RegisterAccess for I2cInterface<I2C>
where
    I2C: i2c::I2c<Error = IE>,
{
    type Error = Error<IE>;

    fn probe(&mut self) -> Result<(), Self::Error> {
        self.i2c
            .write(self.address, &[])
            .map_err(Error::Interface)
    }

    fn read_registers(&mut self, start_register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c
            .write_read(self.address, &[start_register], data)
            .map_err(Error::Interface)?;

        Ok(())
    }

    fn write_registers(&mut self, start_register: u8, data: &[u8]) -> Result<(), Self::Error> {
        // register offset followed by the payload, sent as one contiguous write
        let mut buffer = [0u8; MAX_WRITE_LEN + 1];
        let len = data.len() + 1;

        if len > buffer.len() {
            return Err(Error::BufferOverrun);
        }

        buffer[0] = start_register;
        buffer[1..len].copy_from_slice(data);

        self.i2c
            .write(self.address, &buffer[..len])
            .map_err(Error::Interface)?;

        Ok(())
    }
}
