//! Phone-side companion: reads the last document written for the paired
//! watch, queries today's forecast and pushes it to the sync channel.

use heapless::String;

use crate::error::{CodecError, Result};
use crate::sync::{location_from, Location};

pub mod driver;
pub mod forecast;
pub mod machine;
pub mod view;

pub use driver::CompanionDriver;
pub use forecast::{ForecastQuery, ForecastRow, ForecastStore, MemoryForecastStore};
pub use machine::{Command, Companion, CompanionEvent, CompanionState};
pub use view::{CompanionView, ComponentName, Notice};

/// Maximum peer id length in bytes.
pub const PEER_ID_CAPACITY: usize = 32;

pub type PeerId = String<PEER_ID_CAPACITY>;

/// Start-up parameters of the companion screen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompanionConfig {
    /// Paired watch, if the host knows one.
    pub peer_id: Option<PeerId>,
    /// User's location setting.
    pub preferred_location: Location,
    /// Label of the watch face being configured.
    pub watch_face_component: ComponentName,
}

impl CompanionConfig {
    pub fn new(peer_id: Option<&str>, preferred_location: &str, component: &str) -> Result<Self> {
        let peer_id = match peer_id {
            Some(id) => {
                let mut peer = PeerId::new();
                peer.push_str(id).map_err(|_| CodecError::FieldTooLong)?;
                Some(peer)
            }
            None => None,
        };
        let mut watch_face_component = ComponentName::new();
        watch_face_component
            .push_str(component)
            .map_err(|_| CodecError::FieldTooLong)?;

        Ok(Self {
            peer_id,
            preferred_location: location_from(preferred_location)?,
            watch_face_component,
        })
    }
}
