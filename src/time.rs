//! Wall-clock time keeping

use chrono::{NaiveDate, NaiveDateTime};

/// Known wall-clock time at a given uptime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeReference {
    /// Milliseconds since the Unix epoch
    pub epoch_ms: i64,
    /// Related system uptime
    pub uptime_ms: u64,
}

impl TimeReference {
    pub fn new(epoch_ms: i64, uptime_ms: u64) -> Self {
        Self {
            epoch_ms,
            uptime_ms,
        }
    }

    /// Create new time reference from NaiveDateTime (UTC)
    pub fn from_datetime(time: NaiveDateTime, uptime_ms: u64) -> Self {
        Self::new(time.and_utc().timestamp_millis(), uptime_ms)
    }

    /// Create new time reference from Current Time Service data
    ///
    /// Layout: year (u16 LE), month, day, hours, minutes, seconds, day of
    /// week, fractions of 1/256 s.
    pub fn from_cts_bytes(bytes: &[u8], uptime_ms: u64) -> Option<Self> {
        let [y0, y1, month, day, hour, min, sec, _weekday, fractions, ..] = *bytes else {
            return None;
        };
        let year = u16::from_le_bytes([y0, y1]) as i32;
        let milli = fractions as u32 * 1000 / 256;

        let time = NaiveDate::from_ymd_opt(year, month as u32, day as u32)?.and_hms_milli_opt(
            hour as u32,
            min as u32,
            sec as u32,
            milli,
        )?;
        Some(Self::from_datetime(time, uptime_ms))
    }
}

/// UTC offset in seconds from a Local Time Information value.
///
/// Layout: time zone (i8, 15 min steps, -48..=56), DST offset (u8, 15 min
/// steps). An unknown DST offset (255) counts as none.
pub fn utc_offset_from_lti(bytes: &[u8]) -> Option<i32> {
    const STEP_SECS: i32 = 15 * 60;

    let [zone, dst, ..] = *bytes else {
        return None;
    };
    let zone = zone as i8;
    if !(-48..=56).contains(&zone) {
        return None;
    }
    let dst = match dst {
        0 | 2 | 4 | 8 => dst as i32,
        255 => 0,
        _ => return None,
    };
    Some((zone as i32 + dst) * STEP_SECS)
}

/// Uptime-driven wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    reference: TimeReference,
}

impl WallClock {
    pub fn new(reference: TimeReference) -> Self {
        Self { reference }
    }

    /// Current time in ms since the Unix epoch
    pub fn now_ms(&self, uptime_ms: u64) -> i64 {
        let elapsed = uptime_ms.saturating_sub(self.reference.uptime_ms);
        self.reference.epoch_ms.saturating_add(elapsed as i64)
    }

    /// Update time reference
    pub fn set_time(&mut self, reference: TimeReference) {
        info!("clock set to {} ms", reference.epoch_ms);
        self.reference = reference;
    }

    pub fn reference(&self) -> TimeReference {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_with_uptime() {
        let clock = WallClock::new(TimeReference::new(1_000_000, 500));
        assert_eq!(clock.now_ms(500), 1_000_000);
        assert_eq!(clock.now_ms(1_750), 1_001_250);
        // Uptime before the reference does not run the clock backwards
        assert_eq!(clock.now_ms(0), 1_000_000);
    }

    #[test]
    fn set_time_replaces_reference() {
        let mut clock = WallClock::default();
        clock.set_time(TimeReference::new(86_400_000, 10_000));
        assert_eq!(clock.now_ms(11_000), 86_401_000);
    }

    #[test]
    fn cts_bytes_are_parsed() {
        // 2024-03-03 12:34:56.500, Sunday
        let bytes = [0xE8, 0x07, 3, 3, 12, 34, 56, 7, 128, 0];
        let reference = TimeReference::from_cts_bytes(&bytes, 42).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_milli_opt(12, 34, 56, 500)
            .unwrap();
        assert_eq!(reference.epoch_ms, expected.and_utc().timestamp_millis());
        assert_eq!(reference.uptime_ms, 42);
    }

    #[test]
    fn local_time_information_gives_offset() {
        // UTC+1 with one hour of daylight saving
        assert_eq!(utc_offset_from_lti(&[4, 4]), Some(7_200));
        // UTC-3:30, DST unknown
        assert_eq!(utc_offset_from_lti(&[(-14i8) as u8, 255]), Some(-12_600));
    }

    #[test]
    fn unknown_or_malformed_local_time_is_rejected() {
        assert_eq!(utc_offset_from_lti(&[(-128i8) as u8, 0]), None);
        assert_eq!(utc_offset_from_lti(&[4, 3]), None);
        assert_eq!(utc_offset_from_lti(&[4]), None);
    }

    #[test]
    fn malformed_cts_bytes_are_rejected() {
        assert_eq!(TimeReference::from_cts_bytes(&[0xE8, 0x07, 3], 0), None);
        assert_eq!(
            TimeReference::from_cts_bytes(&[0xE8, 0x07, 13, 3, 0, 0, 0, 0, 0], 0),
            None
        );
    }
}
