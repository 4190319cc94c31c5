//! Draw routine of the analog face.

use core::convert::Infallible;

use embedded_graphics::{
    mono_font::{iso_8859_1::FONT_10X20, MonoTextStyle},
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Alignment, Text},
};

use super::{
    clock::{hand_end, ClockState, HandLengths},
    paint::{HandPaint, RenderState},
};
use crate::config::{BACKGROUND_AMBIENT, ICON_SIZE};
use crate::weather::{WeatherIcon, WeatherSnapshot};

/// Render one frame.
///
/// Interactive: background, weather icon in the left quadrant, high and low
/// temperature on the right, then second, minute and hour hands. Ambient:
/// black, minute and hour hands only.
pub fn draw_face<D>(
    target: &mut D,
    state: &RenderState,
    weather: &WeatherSnapshot,
    clock: &ClockState,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let bounds = target.bounding_box();
    let origin = bounds.top_left;
    let w = bounds.size.width as i32;
    let h = bounds.size.height as i32;

    let background = if clock.ambient {
        BACKGROUND_AMBIENT
    } else {
        state.background
    };
    target.clear(background)?;

    if !clock.ambient {
        let quarter = w / 4;
        let half_icon = ICON_SIZE as i32 / 2;

        WeatherIcon::centered(weather.icon, origin + Point::new(quarter, h / 2)).draw(target)?;

        let high = weather.high_label();
        Text::with_alignment(
            high.as_str(),
            origin + Point::new(w - quarter, h / 2 - half_icon),
            MonoTextStyle::new(&FONT_10X20, state.high_text),
            Alignment::Center,
        )
        .draw(target)?;

        let low = weather.low_label();
        Text::with_alignment(
            low.as_str(),
            origin + Point::new(w - quarter, h / 2 + ICON_SIZE as i32),
            MonoTextStyle::new(&FONT_10X20, state.low_text),
            Alignment::Center,
        )
        .draw(target)?;
    }

    // Centre of the whole screen, ignoring insets such as a round "chin"
    let center = origin + Point::new(w / 2, h / 2);
    let lengths = HandLengths::for_radius(w as f32 / 2.0);

    if !clock.ambient {
        draw_hand(
            target,
            center,
            clock.second_angle,
            lengths.second,
            &state.second_hand,
            background,
        )?;
    }
    draw_hand(
        target,
        center,
        clock.minute_angle,
        lengths.minute,
        &state.hand,
        background,
    )?;
    draw_hand(
        target,
        center,
        clock.hour_angle,
        lengths.hour,
        &state.hand,
        background,
    )
}

fn draw_hand<D>(
    target: &mut D,
    center: Point,
    angle: f32,
    length: f32,
    paint: &HandPaint,
    background: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let line = Line::new(center, hand_end(center, angle, length));
    if paint.anti_alias {
        // Soften the edges with a half-intensity rim under the stroke
        line.into_styled(PrimitiveStyle::with_stroke(
            blend(paint.color, background),
            paint.stroke + 2,
        ))
        .draw(target)?;
    }
    line.into_styled(PrimitiveStyle::with_stroke(paint.color, paint.stroke))
        .draw(target)
}

/// Channel-wise midpoint of two colours.
pub fn blend(a: Rgb565, b: Rgb565) -> Rgb565 {
    let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
    Rgb565::new(mid(a.r(), b.r()), mid(a.g(), b.g()), mid(a.b(), b.b()))
}

/// Off-screen RGB565 frame buffer.
///
/// Too large for the watch's RAM at full size; used by host tests and
/// simulators to inspect rendered pixels.
pub struct Frame<const W: usize, const H: usize> {
    pixels: [[Rgb565; W]; H],
}

impl<const W: usize, const H: usize> Frame<W, H> {
    pub const fn new(color: Rgb565) -> Self {
        Self {
            pixels: [[color; W]; H],
        }
    }

    /// Colour at `p`, or `None` outside the frame.
    pub fn pixel(&self, p: Point) -> Option<Rgb565> {
        let x = usize::try_from(p.x).ok()?;
        let y = usize::try_from(p.y).ok()?;
        self.pixels.get(y)?.get(x).copied()
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb565> + '_ {
        self.pixels.iter().flat_map(|row| row.iter().copied())
    }
}

impl<const W: usize, const H: usize> OriginDimensions for Frame<W, H> {
    fn size(&self) -> Size {
        Size::new(W as u32, H as u32)
    }
}

impl<const W: usize, const H: usize> DrawTarget for Frame<W, H> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                if let Some(px) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *px = color;
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for row in self.pixels.iter_mut() {
            row.fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BACKGROUND_LIGHT, HAND_COLOR, ICON_SUN_COLOR, SECOND_HAND_COLOR};
    use chrono::NaiveDate;

    type Screen = Frame<240, 240>;

    fn clock(h: u32, m: u32, s: u32, ambient: bool) -> ClockState {
        let t = NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap();
        ClockState::at(t, ambient, 0)
    }

    fn render(state: &RenderState, clock: &ClockState) -> Box<Screen> {
        let mut frame = Box::new(Screen::new(Rgb565::BLACK));
        draw_face(frame.as_mut(), state, &WeatherSnapshot::default(), clock).unwrap();
        frame
    }

    fn count(frame: &Screen, color: Rgb565) -> usize {
        frame.pixels().filter(|&c| c == color).count()
    }

    #[test]
    fn interactive_frame_has_background_icon_and_second_hand() {
        let state = RenderState::default();
        let frame = render(&state, &clock(0, 0, 15, false));

        assert_eq!(frame.pixel(Point::new(0, 0)), Some(BACKGROUND_LIGHT));
        // Sun of the clear-sky icon at (w/4, h/2)
        assert_eq!(frame.pixel(Point::new(60, 120)), Some(ICON_SUN_COLOR));
        // Second hand points at three o'clock
        assert_eq!(frame.pixel(Point::new(200, 120)), Some(SECOND_HAND_COLOR));
        // Minute hand straight up
        assert_eq!(frame.pixel(Point::new(120, 60)), Some(HAND_COLOR));
    }

    #[test]
    fn ambient_frame_is_black_without_second_hand_or_decorations() {
        let state = RenderState::default();
        let frame = render(&state, &clock(0, 0, 15, true));

        assert_eq!(frame.pixel(Point::new(0, 0)), Some(BACKGROUND_AMBIENT));
        assert_eq!(frame.pixel(Point::new(60, 120)), Some(BACKGROUND_AMBIENT));
        assert_eq!(count(&frame, SECOND_HAND_COLOR), 0);
        assert_eq!(count(&frame, ICON_SUN_COLOR), 0);
        assert_eq!(frame.pixel(Point::new(120, 60)), Some(HAND_COLOR));
    }

    #[test]
    fn anti_aliasing_draws_a_blended_rim() {
        let mut state = RenderState::default();
        state.set_ambient(true);
        let rim = blend(HAND_COLOR, BACKGROUND_AMBIENT);

        let smooth = render(&state, &clock(0, 0, 0, true));
        assert!(count(&smooth, rim) > 0);

        state.low_bit_ambient = true;
        state.set_ambient(false);
        state.set_ambient(true);
        let hard = render(&state, &clock(0, 0, 0, true));
        assert_eq!(count(&hard, rim), 0);
    }

    #[test]
    fn temperature_labels_are_drawn_right_of_centre() {
        let state = RenderState::default();
        let frame = render(&state, &clock(0, 0, 0, false));

        let right_half_text = (120..240)
            .flat_map(|x| (0..240).map(move |y| Point::new(x, y)))
            .filter(|&p| frame.pixel(p) == Some(state.low_text))
            .count();
        assert!(right_half_text > 0);
    }

    #[test]
    fn blend_is_midpoint() {
        assert_eq!(
            blend(Rgb565::new(31, 63, 31), Rgb565::new(1, 1, 1)),
            Rgb565::new(16, 32, 16)
        );
    }

    #[test]
    fn frame_ignores_out_of_bounds_pixels() {
        let mut frame = Frame::<4, 4>::new(Rgb565::BLACK);
        Pixel(Point::new(-1, 2), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(4, 0), Rgb565::RED).draw(&mut frame).unwrap();
        Pixel(Point::new(3, 3), Rgb565::RED).draw(&mut frame).unwrap();

        assert_eq!(frame.pixels().filter(|&c| c == Rgb565::RED).count(), 1);
        assert_eq!(frame.pixel(Point::new(3, 3)), Some(Rgb565::RED));
        assert_eq!(frame.pixel(Point::new(4, 3)), None);
    }
}
