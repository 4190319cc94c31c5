//! Render state owned by the watch face.

use embedded_graphics::pixelcolor::Rgb565;

use crate::config::{
    BACKGROUND_DARK, BACKGROUND_LIGHT, HAND_COLOR, HAND_STROKE, HIGH_TEXT_COLOR, LOW_TEXT_COLOR,
    SECOND_HAND_COLOR, SECOND_HAND_STROKE,
};

/// Stroke settings for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandPaint {
    pub color: Rgb565,
    pub stroke: u32,
    pub anti_alias: bool,
}

/// Everything the draw routine needs besides time and weather.
///
/// Built once when the face is created and mutated only by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub background: Rgb565,
    pub hand: HandPaint,
    pub second_hand: HandPaint,
    pub high_text: Rgb565,
    pub low_text: Rgb565,
    /// Completed taps since start-up.
    pub tap_count: u32,
    /// Display uses fewer bits per colour in ambient mode.
    pub low_bit_ambient: bool,
    pub ambient: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            background: BACKGROUND_LIGHT,
            hand: HandPaint {
                color: HAND_COLOR,
                stroke: HAND_STROKE,
                anti_alias: true,
            },
            second_hand: HandPaint {
                color: SECOND_HAND_COLOR,
                stroke: SECOND_HAND_STROKE,
                anti_alias: true,
            },
            high_text: HIGH_TEXT_COLOR,
            low_text: LOW_TEXT_COLOR,
            tap_count: 0,
            low_bit_ambient: false,
            ambient: false,
        }
    }
}

impl RenderState {
    /// Enter or leave ambient mode. Returns `false` if nothing changed.
    ///
    /// On low-bit displays anti-aliasing is off for both hands while ambient.
    pub fn set_ambient(&mut self, ambient: bool) -> bool {
        if self.ambient == ambient {
            return false;
        }
        self.ambient = ambient;
        if self.low_bit_ambient {
            self.hand.anti_alias = !ambient;
            self.second_hand.anti_alias = !ambient;
        }
        true
    }

    /// Count a completed tap and swap the background.
    pub fn tap(&mut self) {
        self.tap_count = self.tap_count.wrapping_add(1);
        self.background = if self.tap_count % 2 == 0 {
            BACKGROUND_LIGHT
        } else {
            BACKGROUND_DARK
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_bit_ambient_disables_anti_aliasing_on_both_hands() {
        let mut state = RenderState {
            low_bit_ambient: true,
            ..Default::default()
        };

        assert!(state.set_ambient(true));
        assert!(!state.hand.anti_alias);
        assert!(!state.second_hand.anti_alias);

        assert!(state.set_ambient(false));
        assert!(state.hand.anti_alias);
        assert!(state.second_hand.anti_alias);
    }

    #[test]
    fn full_colour_ambient_keeps_anti_aliasing() {
        let mut state = RenderState::default();
        state.set_ambient(true);
        assert!(state.hand.anti_alias);
        assert!(state.second_hand.anti_alias);
    }

    #[test]
    fn repeated_ambient_signal_is_ignored() {
        let mut state = RenderState::default();
        assert!(state.set_ambient(true));
        assert!(!state.set_ambient(true));
    }

    #[test]
    fn two_taps_restore_background() {
        let mut state = RenderState::default();
        let original = state.background;

        state.tap();
        assert_eq!(state.background, BACKGROUND_DARK);
        state.tap();
        assert_eq!(state.background, original);
        assert_eq!(state.tap_count, 2);
    }
}
