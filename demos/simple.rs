use embedded_graphics_core::{pixelcolor::Gray8, prelude::*};
use embedded_hal::delay::DelayNs;
use is31fl3731::{Is31fl3731, Rotation, DEFAULT_ADDRESS, HEIGHT, WIDTH};

fn main() {
    // placeholders, replace with instances from your HAL
    let i2c_bus = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    let mut delay = embedded_hal_mock::eh1::delay::NoopDelay::new();

    let mut led_driver = Is31fl3731::new_with_i2c(i2c_bus, DEFAULT_ADDRESS, &mut delay).unwrap();
    led_driver.set_rotation(Rotation::Deg180);

    let mut column = 0;

    loop {
        // draw into the frame that is not displayed, then flip
        let back = (led_driver.frame() + 1) % 2;
        led_driver.set_frame(back);
        led_driver.clear().unwrap();

        // a vertical bar running across the matrix
        led_driver
            .draw_iter((0..HEIGHT).map(|y| {
                Pixel(
                    Point::new(column, y.into()),
                    Gray8::new(0x40 + y * 0x10),
                )
            }))
            .unwrap();
        led_driver.display_frame(back).unwrap();

        column = (column + 1) % i32::from(WIDTH);

        // update at roughly 50Hz
        delay.delay_ms(20);
    }
}
