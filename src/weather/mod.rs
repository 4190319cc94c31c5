//! Weather shown on the face.

use heapless::String;

use crate::config::{
    DEFAULT_CONDITION_CODE, DEFAULT_HIGH_TEMP, DEFAULT_LOCATION, DEFAULT_LOW_TEMP,
};
use crate::sync::{Location, SyncDocument};

pub mod icon;

pub use icon::{icon_id, lookup, IconKind, WeatherIcon, NO_ICON};

/// Buffer length of a formatted temperature label.
pub const TEMP_LABEL_LEN: usize = 16;

/// Last weather received by the watch. Lives only for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherSnapshot {
    pub icon: IconKind,
    pub condition_code: i32,
    pub high: f32,
    pub low: f32,
    pub location: Location,
    /// Milliseconds since the Unix epoch of the forecast query.
    pub timestamp: i64,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        let mut location = Location::new();
        let _ = location.push_str(DEFAULT_LOCATION);
        Self {
            icon: IconKind::Clear,
            condition_code: DEFAULT_CONDITION_CODE,
            high: DEFAULT_HIGH_TEMP,
            low: DEFAULT_LOW_TEMP,
            location,
            timestamp: 0,
        }
    }
}

impl WeatherSnapshot {
    /// Merge the keys present in `doc`.
    ///
    /// A zero condition code is ignored. A code without an icon keeps the
    /// previous icon. Returns whether any field was taken from `doc`.
    pub fn apply(&mut self, doc: &SyncDocument) -> bool {
        let mut updated = false;

        if let Some(code) = doc.forecast.filter(|&code| code != 0) {
            self.condition_code = code;
            match lookup(code) {
                Some(icon) => self.icon = icon,
                None => debug!("no icon for condition code {}, keeping previous", code),
            }
            updated = true;
        }
        if let Some(high) = doc.max_temp {
            self.high = high;
            updated = true;
        }
        if let Some(low) = doc.min_temp {
            self.low = low;
            updated = true;
        }
        if let Some(location) = &doc.location {
            self.location = location.clone();
            updated = true;
        }
        if let Some(timestamp) = doc.datetime {
            self.timestamp = timestamp;
            updated = true;
        }

        updated
    }

    pub fn high_label(&self) -> String<TEMP_LABEL_LEN> {
        format_temperature(self.high)
    }

    pub fn low_label(&self) -> String<TEMP_LABEL_LEN> {
        format_temperature(self.low)
    }
}

/// Whole degrees followed by a degree sign, e.g. `25°`.
pub fn format_temperature(temp: f32) -> String<TEMP_LABEL_LEN> {
    let mut buf = [0u8; TEMP_LABEL_LEN];
    let mut label = String::new();
    match format_no_std::show(&mut buf, format_args!("{:.0}\u{b0}", temp)) {
        Ok(text) => {
            let _ = label.push_str(text);
        }
        Err(_) => {
            let _ = label.push_str("--\u{b0}");
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_face() {
        let snapshot = WeatherSnapshot::default();
        assert_eq!(snapshot.icon, IconKind::Clear);
        assert_eq!(snapshot.high, 25.0);
        assert_eq!(snapshot.low, 16.0);
        assert_eq!(snapshot.location.as_str(), "94043");
    }

    #[test]
    fn partial_update_only_touches_present_keys() {
        let mut snapshot = WeatherSnapshot::default();
        snapshot.apply(&SyncDocument::full("94043", 1000, 500, 20.0, 12.0).unwrap());

        let changed = snapshot.apply(&SyncDocument {
            max_temp: Some(30.0),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(snapshot.high, 30.0);
        assert_eq!(snapshot.condition_code, 500);
        assert_eq!(snapshot.icon, IconKind::Rain);
        assert_eq!(snapshot.low, 12.0);
    }

    #[test]
    fn unknown_code_keeps_previous_icon() {
        let mut snapshot = WeatherSnapshot::default();
        snapshot.apply(&SyncDocument {
            forecast: Some(211),
            ..Default::default()
        });
        assert_eq!(snapshot.icon, IconKind::Storm);

        snapshot.apply(&SyncDocument {
            forecast: Some(999),
            ..Default::default()
        });
        assert_eq!(snapshot.icon, IconKind::Storm);
        assert_eq!(snapshot.condition_code, 999);
    }

    #[test]
    fn zero_code_is_ignored() {
        let mut snapshot = WeatherSnapshot::default();
        let changed = snapshot.apply(&SyncDocument {
            forecast: Some(0),
            ..Default::default()
        });
        assert!(!changed);
        assert_eq!(snapshot.condition_code, 800);
    }

    #[test]
    fn empty_document_changes_nothing() {
        let mut snapshot = WeatherSnapshot::default();
        assert!(!snapshot.apply(&SyncDocument::default()));
        assert_eq!(snapshot, WeatherSnapshot::default());
    }

    #[test]
    fn temperatures_round_to_whole_degrees() {
        assert_eq!(format_temperature(25.0).as_str(), "25\u{b0}");
        assert_eq!(format_temperature(16.4).as_str(), "16\u{b0}");
        assert_eq!(format_temperature(-3.6).as_str(), "-4\u{b0}");
    }
}
