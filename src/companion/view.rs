//! Text shown on the companion screen.

use heapless::String;

use super::forecast::ForecastRow;
use crate::sync::{Location, SyncDocument};

/// Maximum length of the watch-face component label.
pub const COMPONENT_CAPACITY: usize = 64;

pub type ComponentName = String<COMPONENT_CAPACITY>;

/// Informational, non-cancelable message with a single acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    NoDeviceConnected,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoDeviceConnected => "No wearable device is currently connected.",
        }
    }

    pub fn acknowledge_label(&self) -> &'static str {
        "OK"
    }
}

/// Companion screen contents. Empty fields show as blank.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompanionView {
    pub component: ComponentName,
    pub location: Location,
    /// Time of the last forecast query, ms since the Unix epoch.
    pub datetime: Option<i64>,
    pub forecast: Option<i32>,
    pub high: Option<f32>,
    pub low: Option<f32>,
    pub refresh_enabled: bool,
    pub notice: Option<Notice>,
}

impl CompanionView {
    pub fn new(component: ComponentName, location: Location) -> Self {
        Self {
            component,
            location,
            datetime: None,
            forecast: None,
            high: None,
            low: None,
            refresh_enabled: false,
            notice: None,
        }
    }

    /// Fill the fields from `doc`, falling back to `default_location` and
    /// blanks for missing keys.
    pub fn show_document(&mut self, doc: Option<&SyncDocument>, default_location: &Location) {
        self.location = doc
            .and_then(|d| d.location.clone())
            .unwrap_or_else(|| default_location.clone());
        self.datetime = doc.and_then(|d| d.datetime);
        self.forecast = doc.and_then(|d| d.forecast);
        self.high = doc.and_then(|d| d.max_temp);
        self.low = doc.and_then(|d| d.min_temp);
    }

    pub fn show_row(&mut self, row: &ForecastRow) {
        self.forecast = Some(row.condition_code);
        self.high = Some(row.max_temp);
        self.low = Some(row.min_temp);
    }
}
