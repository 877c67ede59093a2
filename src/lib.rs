//! Driver for the Lumissil (ISSI) IS31FL3731 charlieplexed LED matrix driver.
//!
//! The chip drives a 16x9 matrix of LEDs with 8-bit PWM each, and stores 8
//! independent frames of PWM data. This driver runs the chip in picture mode:
//! one frame is displayed while any frame can be written.
//!
//! Datasheet: <https://www.lumissil.com/assets/pdf/core/IS31FL3731_DS.pdf>
//!
//! An [`embedded_graphics_core::draw_target::DrawTarget`] implementation is
//! provided, using the luma of [`Gray8`] as the PWM value.

#![cfg_attr(not(test), no_std)]

pub mod interface;
mod register;

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Gray8, IntoStorage},
    Pixel,
};
use embedded_hal::delay::DelayNs;
use interface::RegisterAccess;
use register::{Bank, BitFlags, Register};

/// Error enum for the IS31FL3731 driver
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<IE> {
    /// An interface related error has occured
    Interface(IE),

    /// No device acknowledged the address during initialization
    NotFound,

    /// Temporary buffer too small
    BufferOverrun,
}

/// I2C address with the AD pin connected to GND
pub const DEFAULT_ADDRESS: u8 = 0x74;

/// Bus clock the chip is operated at. `embedded-hal` buses get their clock when
/// they are created by the HAL, so configure it there.
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Number of LED columns
pub const WIDTH: u8 = 16;

/// Number of LED rows
pub const HEIGHT: u8 = 9;

/// Total number of LEDs, each with its own PWM register
pub const NUM_PIXELS: u8 = WIDTH * HEIGHT;

/// Number of frames stored by the chip
pub const NUM_FRAMES: u8 = Bank::FRAME_LAST + 1;

/// Time the chip is held in software shutdown during initialization
pub const T_SHUTDOWN_MS: u32 = 10;

/// PWM bytes written per transaction when clearing a frame
const CLEAR_CHUNK_LEN: usize = 24;

/// Display rotation applied by [`Is31fl3731::draw_pixel`], clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// 90° clockwise
    Deg90,
    /// 180°
    Deg180,
    /// 270° clockwise
    Deg270,
}

impl Rotation {
    /// Rotation from a number of quarter turns, wrapping after four.
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    /// True, if rows and columns are swapped by this rotation.
    pub const fn is_transposed(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Maps logical coordinates onto the LED matrix.
    fn map(&self, x: i32, y: i32) -> (i32, i32) {
        let max_x = i32::from(WIDTH) - 1;
        let max_y = i32::from(HEIGHT) - 1;

        match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (max_x.saturating_sub(y), x),
            Rotation::Deg180 => (max_x.saturating_sub(x), max_y.saturating_sub(y)),
            Rotation::Deg270 => (y, max_y.saturating_sub(x)),
        }
    }
}

/// Driver for the IS31FL3731.
pub struct Is31fl3731<I> {
    interface: I,
    frame: u8,
    rotation: Rotation,
}

impl<IE, I2C> Is31fl3731<interface::I2cInterface<I2C>>
where
    I2C: embedded_hal::i2c::I2c<Error = IE>,
{
    /// Create and initialize a driver for the chip at `address` on `i2c`.
    pub fn new_with_i2c<D: DelayNs>(
        i2c: I2C,
        address: u8,
        delay: &mut D,
    ) -> Result<Is31fl3731<interface::I2cInterface<I2C>>, Error<IE>> {
        Is31fl3731::new(interface::I2cInterface::new(i2c, address), delay)
    }

    /// Destroys the driver and releases the owned `I2c`-interface.
    pub fn release(self) -> I2C {
        self.interface.release()
    }
}

impl<I, IE> Is31fl3731<I>
where
    I: RegisterAccess<Error = Error<IE>>,
{
    /// Create a new IS31FL3731 driver instance on the given `interface`.
    /// A `delay` is required for the shutdown timing.
    ///
    /// The returned driver has been initialized, see [`Is31fl3731::init`].
    pub fn new<D: DelayNs>(interface: I, delay: &mut D) -> Result<Is31fl3731<I>, Error<IE>> {
        let mut driver = Is31fl3731 {
            interface,
            frame: 0,
            rotation: Rotation::Deg0,
        };
        driver.init(delay)?;

        Ok(driver)
    }

    /// Brings the chip into a known state: picture mode, frame 0 displayed and
    /// selected, all PWM values zero and every LED enabled, so that brightness
    /// is controlled by PWM alone.
    ///
    /// Returns [`Error::NotFound`] without further bus traffic if the chip
    /// does not acknowledge its address.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<IE>> {
        if self.interface.probe().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("IS31FL3731 did not acknowledge its address");
            return Err(Error::NotFound);
        }

        self.interface.set_speed(I2C_FREQUENCY_HZ)?;
        self.frame = 0;

        self.software_shutdown(true)?;
        delay.delay_ms(T_SHUTDOWN_MS);
        self.software_shutdown(false)?;

        self.write_register8(
            Bank::FUNCTION,
            Register::CONFIG,
            BitFlags::CONFIG_PICTURE_MODE,
        )?;
        self.display_frame(self.frame)?;

        for frame in 0..NUM_FRAMES {
            self.clear_frame(frame)?;
        }

        for frame in 0..NUM_FRAMES {
            for reg in Register::LED_CONTROL_START..=Register::LED_CONTROL_END {
                self.write_register8(frame, reg, BitFlags::LED_CONTROL_ALL_ON)?;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("IS31FL3731 initialized");

        Ok(())
    }

    /// Enter (`true`) or leave (`false`) software shutdown.
    pub fn software_shutdown(&mut self, shutdown: bool) -> Result<(), Error<IE>> {
        self.write_register8(
            Bank::FUNCTION,
            Register::SHUTDOWN,
            if shutdown {
                BitFlags::SHUTDOWN_SHUTDOWN
            } else {
                BitFlags::SHUTDOWN_NORMAL
            },
        )
    }

    /// Sets the PWM of all LEDs in the current frame to 0.
    pub fn clear(&mut self) -> Result<(), Error<IE>> {
        self.clear_frame(self.frame)
    }

    fn clear_frame(&mut self, frame: u8) -> Result<(), Error<IE>> {
        self.select_bank(frame)?;

        for start in (0..NUM_PIXELS).step_by(CLEAR_CHUNK_LEN) {
            self.interface
                .write_registers(Register::pwm(start), &[0; CLEAR_CHUNK_LEN])?;
        }

        Ok(())
    }

    /// Sets the PWM of all LEDs in the current frame to `pwm`.
    pub fn fill(&mut self, pwm: u8) -> Result<(), Error<IE>> {
        self.select_bank(self.frame)?;
        self.interface
            .write_registers(Register::PWM_START, &[pwm; NUM_PIXELS as usize])
    }

    /// Low level accessor, sets the PWM of LED `index` in `bank`. Does not handle
    /// rotation or x/y coordinates. Indices of 144 and above are ignored.
    pub fn set_pixel_pwm(&mut self, index: u8, pwm: u8, bank: u8) -> Result<(), Error<IE>> {
        if index >= NUM_PIXELS {
            return Ok(());
        }

        self.write_register8(bank, Register::pwm(index), pwm)
    }

    /// Reads back the PWM of LED `index` in `bank`. Indices of 144 and above read as 0.
    pub fn pixel_pwm(&mut self, index: u8, bank: u8) -> Result<u8, Error<IE>> {
        if index >= NUM_PIXELS {
            return Ok(0);
        }

        self.read_register8(bank, Register::pwm(index))
    }

    /// Sets the PWM of the LED at `x`, `y` in the current frame, honoring the rotation.
    ///
    /// `color` is clamped to 255. Coordinates outside of the matrix are ignored.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u16) -> Result<(), Error<IE>> {
        let (x, y) = self.rotation.map(x, y);

        if !(0..i32::from(WIDTH)).contains(&x) || !(0..i32::from(HEIGHT)).contains(&y) {
            return Ok(());
        }

        let pwm = color.min(u16::from(u8::MAX)) as u8;
        let index = (x + y * i32::from(WIDTH)) as u8;

        self.set_pixel_pwm(index, pwm, self.frame)
    }

    /// Sets the on/off state of the 16 LEDs in `row` of the current frame.
    /// `bits_r` covers the LEDs of the lower register. Rows of 9 and above are ignored.
    ///
    /// `row` is a matrix row, not a register offset: row `n` is written at
    /// offset `2 * n` of the on/off region.
    pub fn set_led_bytes(&mut self, row: u8, bits_l: u8, bits_r: u8) -> Result<(), Error<IE>> {
        if row >= HEIGHT {
            return Ok(());
        }

        self.select_bank(self.frame)?;
        self.interface
            .write_registers(Register::led_control_row(row), &[bits_r, bits_l])
    }

    /// Sets the on/off state of `rows.len()` consecutive rows of the current frame,
    /// starting at `start_row`, in a single transaction. Ignored if the rows do not
    /// fit the matrix.
    pub fn set_led_buf(&mut self, start_row: u8, rows: &[u16]) -> Result<(), Error<IE>> {
        let mut buffer = [0u8; HEIGHT as usize * 2];

        if rows.is_empty() || usize::from(start_row) + rows.len() > usize::from(HEIGHT) {
            return Ok(());
        }

        // the chip stores the lower byte of each row first
        buffer
            .chunks_exact_mut(2)
            .zip(rows.iter())
            .for_each(|(dest, src)| dest.copy_from_slice(&src.to_le_bytes()));

        self.select_bank(self.frame)?;
        self.interface.write_registers(
            Register::led_control_row(start_row),
            &buffer[..rows.len() * 2],
        )
    }

    /// Sets the frame that following pixel operations write to. Does not talk
    /// to the chip. Frames above 7 select frame 0.
    pub fn set_frame(&mut self, frame: u8) {
        self.frame = if frame > Bank::FRAME_LAST { 0 } else { frame };
    }

    /// The frame that pixel operations write to.
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Has the chip display the contents of `frame`. Frames above 7 display frame 0.
    pub fn display_frame(&mut self, frame: u8) -> Result<(), Error<IE>> {
        let frame = if frame > Bank::FRAME_LAST { 0 } else { frame };

        self.write_register8(Bank::FUNCTION, Register::PICTURE_FRAME, frame)
    }

    /// Sets the rotation applied to following [`Is31fl3731::draw_pixel`] calls.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// The rotation applied to pixel coordinates.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Switches to `bank` for all following register accesses.
    pub fn select_bank(&mut self, bank: u8) -> Result<(), Error<IE>> {
        self.interface.write_register(Register::COMMAND, bank)
    }

    /// Writes one byte to `reg` in `bank`.
    pub fn write_register8(&mut self, bank: u8, reg: u8, data: u8) -> Result<(), Error<IE>> {
        self.select_bank(bank)?;
        self.interface.write_register(reg, data)
    }

    /// Reads one byte from `reg` in `bank`. Yields `0xFF` if the bus delivered no data.
    pub fn read_register8(&mut self, bank: u8, reg: u8) -> Result<u8, Error<IE>> {
        self.select_bank(bank)?;
        self.interface.read_register(reg)
    }
}

impl<I, IE> DrawTarget for Is31fl3731<I>
where
    I: RegisterAccess<Error = Error<IE>>,
{
    type Color = Gray8;
    type Error = Error<IE>;

    fn draw_iter<P>(&mut self, pixels: P) -> Result<(), Self::Error>
    where
        P: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color.into_storage().into())?;
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.into_storage())
    }
}

impl<I> OriginDimensions for Is31fl3731<I> {
    fn size(&self) -> Size {
        if self.rotation.is_transposed() {
            Size::new(HEIGHT.into(), WIDTH.into())
        } else {
            Size::new(WIDTH.into(), HEIGHT.into())
        }
    }
}

#[cfg(test)]
impl Is31fl3731<interface::mock::MockInterface> {
    /// Destroys the drivers and returns the owned [`MockInterface`].
    pub fn release(self) -> interface::mock::MockInterface {
        self.interface
    }
}
