//! Weather document exchanged between the phone and the watch.
//!
//! The phone writes one flat key→value document at [`SYNC_PATH`] after each
//! forecast query; the watch reads it on connect and on every change
//! notification. Writes replace the whole document, there is no merge and no
//! version field, so the watch always shows the last document it *received*.

use heapless::String;

use crate::error::{CodecError, Result};

pub mod channel;
pub mod codec;

pub use channel::{MemoryChannel, SyncChannel};

/// Well-known path of the weather document.
pub const SYNC_PATH: &str = "/sunshine";

pub const KEY_LOCATION: &str = "LOCATION";
pub const KEY_DATETIME: &str = "DATETIME";
pub const KEY_FORECAST: &str = "FORECAST";
pub const KEY_MAXTEMP: &str = "MAXTEMP";
pub const KEY_MINTEMP: &str = "MINTEMP";

/// Maximum location length in bytes.
pub const LOCATION_CAPACITY: usize = 32;

/// Maximum document path length in bytes.
pub const PATH_CAPACITY: usize = 16;

pub type Location = String<LOCATION_CAPACITY>;
pub type DataPath = String<PATH_CAPACITY>;

/// Typed view of the weather document.
///
/// Every field is optional: a partial document only carries the keys that
/// are present and leaves the receiver's other values untouched.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncDocument {
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    pub datetime: Option<i64>,
    /// Condition code.
    pub forecast: Option<i32>,
    pub max_temp: Option<f32>,
    pub min_temp: Option<f32>,
}

impl SyncDocument {
    /// A document carrying all five fields.
    pub fn full(
        location: &str,
        datetime: i64,
        forecast: i32,
        max_temp: f32,
        min_temp: f32,
    ) -> Result<Self> {
        Ok(Self {
            location: Some(location_from(location)?),
            datetime: Some(datetime),
            forecast: Some(forecast),
            max_temp: Some(max_temp),
            min_temp: Some(min_temp),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        [
            self.location.is_some(),
            self.datetime.is_some(),
            self.forecast.is_some(),
            self.max_temp.is_some(),
            self.min_temp.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_complete(&self) -> bool {
        self.len() == 5
    }
}

/// Copy `s` into a fixed-capacity location string.
pub fn location_from(s: &str) -> Result<Location> {
    let mut location = Location::new();
    location
        .push_str(s)
        .map_err(|_| CodecError::FieldTooLong)?;
    Ok(location)
}

/// Kind of a data event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// Change notification for one document path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub path: DataPath,
    pub document: SyncDocument,
}

impl DataEvent {
    pub fn changed(path: &str, document: SyncDocument) -> Result<Self> {
        Ok(Self {
            kind: DataEventKind::Changed,
            path: path_from(path)?,
            document,
        })
    }

    pub fn deleted(path: &str) -> Result<Self> {
        Ok(Self {
            kind: DataEventKind::Deleted,
            path: path_from(path)?,
            document: SyncDocument::default(),
        })
    }

    /// `true` for a change (not a deletion) of `path`.
    pub fn is_change_for(&self, path: &str) -> bool {
        self.kind == DataEventKind::Changed && self.path.as_str() == path
    }
}

pub(crate) fn path_from(s: &str) -> Result<DataPath> {
    let mut path = DataPath::new();
    path.push_str(s).map_err(|_| CodecError::FieldTooLong)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn full_document_has_all_keys() {
        let doc = SyncDocument::full("94043", 1000, 800, 25.0, 16.0).unwrap();
        assert!(doc.is_complete());
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.location.as_deref(), Some("94043"));
    }

    #[test]
    fn partial_document_counts_present_keys() {
        let doc = SyncDocument {
            max_temp: Some(30.0),
            ..Default::default()
        };
        assert_eq!(doc.len(), 1);
        assert!(!doc.is_complete());
        assert!(SyncDocument::default().is_empty());
    }

    #[test]
    fn oversized_location_is_rejected() {
        let long = "x".repeat(LOCATION_CAPACITY + 1);
        assert_eq!(
            SyncDocument::full(&long, 0, 800, 0.0, 0.0),
            Err(Error::Codec(CodecError::FieldTooLong))
        );
    }

    #[test]
    fn change_filter_matches_kind_and_path() {
        let changed = DataEvent::changed(SYNC_PATH, SyncDocument::default()).unwrap();
        let other = DataEvent::changed("/other", SyncDocument::default()).unwrap();
        let deleted = DataEvent::deleted(SYNC_PATH).unwrap();

        assert!(changed.is_change_for(SYNC_PATH));
        assert!(!other.is_change_for(SYNC_PATH));
        assert!(!deleted.is_change_for(SYNC_PATH));
    }
}
