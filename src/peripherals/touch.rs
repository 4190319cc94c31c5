//! Touch controler module for PineTime

pub use cst816s::TouchGesture;

use cst816s::CST816S;
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_nrf::{
    gpio::{AnyPin, Input, Output},
    twim::{self, Twim},
};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Delay;

use sunshine_face::face::TapKind;

type Touchpad<'a, TWI> =
    CST816S<I2cDevice<'a, NoopRawMutex, Twim<'a, TWI>>, Input<'a, AnyPin>, Output<'a, AnyPin>>;

pub struct TouchController<TWI>
where
    TWI: twim::Instance,
{
    touchpad: Touchpad<'static, TWI>,
}

impl<TWI> TouchController<TWI>
where
    TWI: twim::Instance,
{
    /// Configure touch controller on boot
    pub fn init(
        twi: I2cDevice<'static, NoopRawMutex, Twim<'static, TWI>>,
        interrupt_pin: Input<'static, AnyPin>,
        reset_pin: Output<'static, AnyPin>,
    ) -> Self {
        let mut touchpad = CST816S::new(twi, interrupt_pin, reset_pin);
        if touchpad.setup(&mut Delay).is_err() {
            defmt::warn!("Touch controller setup failed");
        }
        Self { touchpad }
    }

    /// Check for new touch event
    pub fn try_event_detected(&mut self) -> Option<TouchGesture> {
        self.touchpad
            .read_one_touch_event(true)
            .map(|event| event.gesture)
    }
}

/// Face tap phase for a touch gesture. Only a single click counts as a tap;
/// anything else cancels the touch.
pub fn tap_kind(gesture: TouchGesture) -> TapKind {
    match gesture {
        TouchGesture::SingleClick => TapKind::Tap,
        _ => TapKind::TouchCancel,
    }
}
