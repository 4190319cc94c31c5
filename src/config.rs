//! Application-wide constants and compile-time configuration.
//!
//! Display geometry, timing, palette and weather defaults live here so they
//! can be tuned in one place.

use embedded_graphics::pixelcolor::Rgb565;

// Display

/// PineTime LCD width in pixels.
pub const LCD_W: u16 = 240;

/// PineTime LCD height in pixels.
pub const LCD_H: u16 = 240;

// Timing

/// Redraw period in interactive mode (ms). Once a second to advance the
/// second hand.
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1_000;

/// Idle time before the face drops into ambient mode (seconds).
pub const AMBIENT_AFTER_SECS: u64 = 15;

/// UTC offset applied when the face becomes visible (seconds).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 3_600;

// Hands

/// Second hand length is the face radius minus this inset.
pub const SECOND_HAND_INSET: f32 = 20.0;

/// Minute hand length is the face radius minus this inset.
pub const MINUTE_HAND_INSET: f32 = 40.0;

/// Hour hand length is the face radius minus this inset.
pub const HOUR_HAND_INSET: f32 = 80.0;

/// Stroke width of hour and minute hands.
pub const HAND_STROKE: u32 = 3;

/// Stroke width of the second hand.
pub const SECOND_HAND_STROKE: u32 = 2;

// Weather

/// Edge length of the square weather icon.
pub const ICON_SIZE: u32 = 48;

/// Location shown before any document arrives.
pub const DEFAULT_LOCATION: &str = "94043";

/// High temperature shown before any document arrives.
pub const DEFAULT_HIGH_TEMP: f32 = 25.0;

/// Low temperature shown before any document arrives.
pub const DEFAULT_LOW_TEMP: f32 = 16.0;

/// Condition code shown before any document arrives (clear sky).
pub const DEFAULT_CONDITION_CODE: i32 = 800;

// Palette (RGB565 components: r 0..=31, g 0..=63, b 0..=31)

/// Background after an even number of taps.
pub const BACKGROUND_LIGHT: Rgb565 = Rgb565::new(0x03 >> 3, 0xA9 >> 2, 0xF4 >> 3);

/// Background after an odd number of taps.
pub const BACKGROUND_DARK: Rgb565 = Rgb565::new(0x02 >> 3, 0x88 >> 2, 0xD1 >> 3);

/// Background in ambient mode.
pub const BACKGROUND_AMBIENT: Rgb565 = Rgb565::new(0, 0, 0);

/// Hour and minute hands.
pub const HAND_COLOR: Rgb565 = Rgb565::new(31, 63, 31);

/// Second hand.
pub const SECOND_HAND_COLOR: Rgb565 = Rgb565::new(31, 0, 0);

/// High temperature text.
pub const HIGH_TEXT_COLOR: Rgb565 = Rgb565::new(31, 63, 31);

/// Low temperature text.
pub const LOW_TEXT_COLOR: Rgb565 = Rgb565::new(0xB0 >> 3, 0xBE >> 2, 0xC5 >> 3);

/// Sun and lightning fill.
pub const ICON_SUN_COLOR: Rgb565 = Rgb565::new(0xFF >> 3, 0xC1 >> 2, 0x07 >> 3);

/// Cloud, fog and snow fill.
pub const ICON_CLOUD_COLOR: Rgb565 = Rgb565::new(0xEC >> 3, 0xEF >> 2, 0xF1 >> 3);

/// Rain streaks.
pub const ICON_RAIN_COLOR: Rgb565 = Rgb565::new(0x1A >> 3, 0x23 >> 2, 0x7E >> 3);
