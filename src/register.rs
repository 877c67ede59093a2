/// IS31FL3731 registers
///
/// Register table: <https://www.lumissil.com/assets/pdf/core/IS31FL3731_DS.pdf>
pub struct Register;
#[allow(dead_code)]
impl Register {
    /// Writing a bank number here selects the page used by all following accesses.
    pub const COMMAND: u8 = 0xFD;

    // function register bank
    pub const CONFIG: u8 = 0x00;
    pub const PICTURE_FRAME: u8 = 0x01;
    pub const AUDIO_SYNC: u8 = 0x06;
    pub const SHUTDOWN: u8 = 0x0A;

    // frame banks
    //  - 0x00..=0x11: LED on/off, two bytes per row of 16 LEDs
    //  - 0x12..=0x23: LED blink control
    //  - 0x24..=0xB3: LED PWM, one byte per LED
    pub const LED_CONTROL_START: u8 = 0x00;
    pub const LED_CONTROL_END: u8 = 0x11;
    /// `row` must be below 9.
    pub const fn led_control_row(row: u8) -> u8 {
        debug_assert!(row < 9);
        Self::LED_CONTROL_START + row * 2
    }

    pub const BLINK_CONTROL_START: u8 = 0x12;

    pub const PWM_START: u8 = 0x24;
    pub const fn pwm(led: u8) -> u8 {
        Self::PWM_START + led
    }
}

/// Memory banks ("pages") selectable through [`Register::COMMAND`]
pub struct Bank;
impl Bank {
    /// Frame banks are numbered 0 to 7.
    pub const FRAME_LAST: u8 = 7;

    /// Function registers, called "page nine" in the datasheet.
    pub const FUNCTION: u8 = 0x0B;
}

/// Register values
pub struct BitFlags;
#[allow(dead_code)]
impl BitFlags {
    pub const SHUTDOWN_SHUTDOWN: u8 = 0x00;
    pub const SHUTDOWN_NORMAL: u8 = 0x01;

    pub const CONFIG_PICTURE_MODE: u8 = 0x00;
    pub const CONFIG_AUTO_PLAY_MODE: u8 = 0x08;
    pub const CONFIG_AUDIO_PLAY_MODE: u8 = 0x18;

    pub const LED_CONTROL_ALL_ON: u8 = 0xFF;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_control_row() {
        assert_eq!(Register::led_control_row(0), 0x00);
        assert_eq!(Register::led_control_row(8), 0x10);
        assert_eq!(Register::led_control_row(8) + 1, Register::LED_CONTROL_END);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_led_control_row_out_of_range() {
        let _ = Register::led_control_row(9);
    }
}
