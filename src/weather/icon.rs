//! Condition code → icon category.
//!
//! Condition codes follow the OpenWeatherMap taxonomy. The table is sorted
//! and non-overlapping so it can be binary searched; 761 belongs to the fog
//! band, 781 is the only tornado/storm code above it.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

use crate::config::{ICON_CLOUD_COLOR, ICON_RAIN_COLOR, ICON_SIZE, ICON_SUN_COLOR};

/// Returned by [`icon_id`] for codes outside every range.
pub const NO_ICON: i32 = -1;

/// Weather icon categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IconKind {
    Storm = 0,
    LightRain = 1,
    Rain = 2,
    Snow = 3,
    Fog = 4,
    Clear = 5,
    LightClouds = 6,
    Cloudy = 7,
}

/// Inclusive `(first, last, icon)` ranges, sorted by `first`.
const ICON_RANGES: [(i32, i32, IconKind); 11] = [
    (200, 232, IconKind::Storm),
    (300, 321, IconKind::LightRain),
    (500, 504, IconKind::Rain),
    (511, 511, IconKind::Snow),
    (520, 531, IconKind::Rain),
    (600, 622, IconKind::Snow),
    (701, 761, IconKind::Fog),
    (781, 781, IconKind::Storm),
    (800, 800, IconKind::Clear),
    (801, 801, IconKind::LightClouds),
    (802, 804, IconKind::Cloudy),
];

/// Map a condition code to its icon category.
pub fn lookup(code: i32) -> Option<IconKind> {
    // First range whose upper bound is not below `code`
    let idx = ICON_RANGES.partition_point(|&(_, last, _)| last < code);
    match ICON_RANGES.get(idx) {
        Some(&(first, _, icon)) if first <= code => Some(icon),
        _ => None,
    }
}

/// Numeric icon id for a condition code, or [`NO_ICON`].
pub fn icon_id(code: i32) -> i32 {
    lookup(code).map_or(NO_ICON, |icon| icon as i32)
}

/// A weather icon placed on the face.
///
/// Icons are drawn from primitives into an `ICON_SIZE` square whose top-left
/// corner is `top_left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherIcon {
    pub kind: IconKind,
    pub top_left: Point,
}

impl WeatherIcon {
    pub fn new(kind: IconKind, top_left: Point) -> Self {
        Self { kind, top_left }
    }

    /// Icon centred on `center`.
    pub fn centered(kind: IconKind, center: Point) -> Self {
        let half = (ICON_SIZE / 2) as i32;
        Self::new(kind, center - Point::new(half, half))
    }

    pub fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.top_left, Size::new(ICON_SIZE, ICON_SIZE))
    }

    fn at(&self, x: i32, y: i32) -> Point {
        self.top_left + Point::new(x, y)
    }

    fn draw_sun<D>(&self, target: &mut D, center: Point, diameter: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        Circle::with_center(center, diameter)
            .into_styled(PrimitiveStyle::with_fill(ICON_SUN_COLOR))
            .draw(target)
    }

    fn draw_cloud<D>(&self, target: &mut D, dy: i32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let fill = PrimitiveStyle::with_fill(ICON_CLOUD_COLOR);
        Circle::with_center(self.at(17, 22 + dy), 18)
            .into_styled(fill)
            .draw(target)?;
        Circle::with_center(self.at(29, 18 + dy), 22)
            .into_styled(fill)
            .draw(target)?;
        Rectangle::new(self.at(8, 22 + dy), Size::new(32, 10))
            .into_styled(fill)
            .draw(target)
    }

    fn draw_streaks<D>(&self, target: &mut D, count: i32, width: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let style = PrimitiveStyle::with_stroke(ICON_RAIN_COLOR, width);
        for i in 0..count {
            let x = 14 + i * (24 / count.max(1));
            Line::new(self.at(x + 4, 34), self.at(x, 44))
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }
}

impl Drawable for WeatherIcon {
    type Color = Rgb565;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        match self.kind {
            IconKind::Clear => {
                let center = self.at(24, 24);
                let rays = PrimitiveStyle::with_stroke(ICON_SUN_COLOR, 2);
                for (dx, dy) in [(0, -22), (0, 22), (-22, 0), (22, 0)] {
                    Line::new(center, center + Point::new(dx, dy))
                        .into_styled(rays)
                        .draw(target)?;
                }
                self.draw_sun(target, center, 28)
            }
            IconKind::LightClouds => {
                self.draw_sun(target, self.at(32, 14), 20)?;
                self.draw_cloud(target, 6)
            }
            IconKind::Cloudy => self.draw_cloud(target, 2),
            IconKind::LightRain => {
                self.draw_cloud(target, 0)?;
                self.draw_streaks(target, 2, 1)
            }
            IconKind::Rain => {
                self.draw_cloud(target, 0)?;
                self.draw_streaks(target, 4, 2)
            }
            IconKind::Snow => {
                self.draw_cloud(target, 0)?;
                let flake = PrimitiveStyle::with_fill(ICON_CLOUD_COLOR);
                for x in [14, 24, 34] {
                    Circle::with_center(self.at(x, 40), 5)
                        .into_styled(flake)
                        .draw(target)?;
                }
                Ok(())
            }
            IconKind::Fog => {
                let bar = PrimitiveStyle::with_fill(ICON_CLOUD_COLOR);
                for (i, y) in [10, 20, 30, 40].into_iter().enumerate() {
                    let inset = if i % 2 == 0 { 4 } else { 10 };
                    Rectangle::new(self.at(inset, y), Size::new(ICON_SIZE - 2 * inset as u32, 4))
                        .into_styled(bar)
                        .draw(target)?;
                }
                Ok(())
            }
            IconKind::Storm => {
                self.draw_cloud(target, 0)?;
                Triangle::new(self.at(26, 30), self.at(18, 42), self.at(24, 42))
                    .into_styled(PrimitiveStyle::with_fill(ICON_SUN_COLOR))
                    .draw(target)?;
                Triangle::new(self.at(24, 38), self.at(30, 38), self.at(20, 47))
                    .into_styled(PrimitiveStyle::with_fill(ICON_SUN_COLOR))
                    .draw(target)
            }
        }
    }
}
