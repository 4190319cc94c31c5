//! Hand geometry.

use core::f32::consts::PI;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};
use embedded_graphics::geometry::Point;

use crate::config::{HOUR_HAND_INSET, MINUTE_HAND_INSET, SECOND_HAND_INSET};

/// Angle of a hand in radians, clockwise from twelve o'clock.
///
/// A full turn is `2 * period` units: 60 for minutes and seconds (period 30),
/// 12 for hours (period 6).
pub fn hand_angle(value: f32, period: f32) -> f32 {
    value / period * PI
}

/// Per-frame clock state. Recomputed on every redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockState {
    pub hour_angle: f32,
    pub minute_angle: f32,
    pub second_angle: f32,
    pub ambient: bool,
    pub tap_count: u32,
}

impl ClockState {
    pub fn at(local: NaiveDateTime, ambient: bool, tap_count: u32) -> Self {
        let minutes = local.minute() as f32;
        Self {
            hour_angle: hand_angle((local.hour() % 12) as f32 + minutes / 60.0, 6.0),
            minute_angle: hand_angle(minutes, 30.0),
            second_angle: hand_angle(local.second() as f32, 30.0),
            ambient,
            tap_count,
        }
    }
}

/// Local wall-clock time for a Unix timestamp in milliseconds.
pub fn local_time(now_ms: i64, utc_offset_secs: i32) -> Option<NaiveDateTime> {
    let offset = FixedOffset::east_opt(utc_offset_secs)?;
    let utc = DateTime::from_timestamp_millis(now_ms)?;
    Some(utc.with_timezone(&offset).naive_local())
}

/// Hand lengths for a face of the given radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLengths {
    pub second: f32,
    pub minute: f32,
    pub hour: f32,
}

impl HandLengths {
    pub fn for_radius(radius: f32) -> Self {
        Self {
            second: radius - SECOND_HAND_INSET,
            minute: radius - MINUTE_HAND_INSET,
            hour: radius - HOUR_HAND_INSET,
        }
    }
}

/// Tip of a hand of `length` pointing at `angle` from `center`.
pub fn hand_end(center: Point, angle: f32, length: f32) -> Point {
    let dx = libm::sinf(angle) * length;
    let dy = -libm::cosf(angle) * length;
    center + Point::new(libm::roundf(dx) as i32, libm::roundf(dy) as i32)
}
