//! Display control module for PineTime

use embassy_nrf::{
    gpio::{AnyPin, Output},
    spim::{self, Spim},
};
use embassy_time::Delay;

use display_interface_spi::SPIInterface;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use mipidsi::{models::ST7789, Builder, Orientation};

use sunshine_face::{
    config::{BACKGROUND_AMBIENT, LCD_H, LCD_W},
    face::WatchFaceService,
    sync::MemoryChannel,
    Error,
};

type Lcd<'a, SPI> = mipidsi::Display<
    SPIInterface<Spim<'a, SPI>, Output<'a, AnyPin>, Output<'a, AnyPin>>,
    ST7789,
    Output<'a, AnyPin>,
>;

/// ST7789 panel the face is drawn on.
///
/// There is not enough RAM for a full frame buffer, so frames are drawn
/// straight to the panel.
pub struct Display<SPI>
where
    SPI: spim::Instance,
{
    lcd: Lcd<'static, SPI>,
}

impl<SPI> Display<SPI>
where
    SPI: spim::Instance,
{
    /// Configure display settings on boot
    pub fn init(
        spim: Spim<'static, SPI>,
        cs_pin: Output<'static, AnyPin>,
        dc_pin: Output<'static, AnyPin>,
        rst_pin: Output<'static, AnyPin>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc_pin, cs_pin))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Display)?;

        let mut display = Self { lcd };
        display.clear(BACKGROUND_AMBIENT)?;
        Ok(display)
    }

    /// Clear the display
    pub fn clear(&mut self, color: Rgb565) -> Result<(), Error> {
        self.lcd.clear(color).map_err(|_| Error::Display)
    }

    /// Render the watch face as of `now_ms`.
    pub fn draw_face(
        &mut self,
        face: &WatchFaceService<MemoryChannel>,
        now_ms: i64,
    ) -> Result<(), Error> {
        face.draw(&mut self.lcd, now_ms).map_err(|_| Error::Display)
    }
}
