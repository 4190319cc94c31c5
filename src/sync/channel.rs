//! Synchronization channel abstraction.
//!
//! Both ends talk to the channel through [`SyncChannel`]. [`MemoryChannel`]
//! keeps the encoded document per path locally and queues change events for
//! registered listeners; the firmware feeds it with documents received over
//! BLE, the host tests use it as a loopback.

use heapless::{Deque, Vec};

use super::{codec, path_from, DataEvent, DataPath, SyncDocument};
use crate::error::{Error, Result};

/// Maximum number of distinct document paths held by [`MemoryChannel`].
pub const MAX_PATHS: usize = 4;

/// Maximum number of registered listener paths.
pub const MAX_LISTENERS: usize = 4;

/// Maximum number of undelivered change events.
pub const EVENT_QUEUE_LEN: usize = 8;

/// Device-to-device key/value document replication.
pub trait SyncChannel {
    /// Open the channel.
    fn connect(&mut self) -> Result<()>;

    /// Close the channel. Listeners stay registered for the next connect.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Receive change events for `path` through [`SyncChannel::poll_event`].
    fn add_listener(&mut self, path: &str) -> Result<()>;

    fn remove_listener(&mut self, path: &str);

    /// Read the current document at `path`, addressed to `peer` when given.
    ///
    /// `Ok(None)` means no document was ever written.
    fn fetch(&mut self, peer: Option<&str>, path: &str) -> Result<Option<SyncDocument>>;

    /// Replace the document at `path`. Last write wins.
    fn put(&mut self, path: &str, doc: &SyncDocument) -> Result<()>;

    /// Next pending change event, if any.
    fn poll_event(&mut self) -> Option<DataEvent>;
}

/// In-memory channel holding one encoded document per path.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    connected: bool,
    refuse_connect: bool,
    fail_fetch: bool,
    documents: Vec<(DataPath, codec::Encoded), MAX_PATHS>,
    listeners: Vec<DataPath, MAX_LISTENERS>,
    events: Deque<DataEvent, EVENT_QUEUE_LEN>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next connection attempts fail.
    pub fn refuse_connections(&mut self, refuse: bool) {
        self.refuse_connect = refuse;
    }

    /// Make document fetches fail.
    pub fn fail_fetches(&mut self, fail: bool) {
        self.fail_fetch = fail;
    }

    /// Encoded bytes of the document at `path`.
    pub fn document_bytes(&self, path: &str) -> Option<&[u8]> {
        self.documents
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Store a document written by the remote peer and notify listeners.
    ///
    /// Works while disconnected too: replication into the local store does
    /// not depend on this end's client connection.
    pub fn receive(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let doc = codec::decode(bytes)?;
        let encoded = codec::Encoded::from_slice(bytes).map_err(|_| Error::BufferOverflow)?;
        self.store(path, encoded)?;
        self.notify(DataEvent::changed(path, doc)?);
        Ok(())
    }

    /// Remove the document at `path` and notify listeners.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        if let Some(idx) = self.documents.iter().position(|(p, _)| p.as_str() == path) {
            self.documents.swap_remove(idx);
            self.notify(DataEvent::deleted(path)?);
        }
        Ok(())
    }

    fn store(&mut self, path: &str, encoded: codec::Encoded) -> Result<()> {
        match self.documents.iter_mut().find(|(p, _)| p.as_str() == path) {
            Some((_, bytes)) => *bytes = encoded,
            None => self
                .documents
                .push((path_from(path)?, encoded))
                .map_err(|_| Error::BufferOverflow)?,
        }
        Ok(())
    }

    fn notify(&mut self, event: DataEvent) {
        if !self.listeners.iter().any(|p| *p == event.path) {
            return;
        }
        if self.events.is_full() {
            warn!("sync channel: event queue full, dropping oldest event");
            self.events.pop_front();
        }
        // Cannot fail after making room
        let _ = self.events.push_back(event);
    }
}

impl SyncChannel for MemoryChannel {
    fn connect(&mut self) -> Result<()> {
        if self.refuse_connect {
            return Err(Error::ConnectFailed);
        }
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn add_listener(&mut self, path: &str) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.listeners.iter().any(|p| p.as_str() == path) {
            return Ok(());
        }
        self.listeners
            .push(path_from(path)?)
            .map_err(|_| Error::BufferOverflow)
    }

    fn remove_listener(&mut self, path: &str) {
        self.listeners.retain(|p| p.as_str() != path);

        let mut kept = Deque::new();
        while let Some(event) = self.events.pop_front() {
            if event.path.as_str() != path {
                let _ = kept.push_back(event);
            }
        }
        self.events = kept;
    }

    fn fetch(&mut self, _peer: Option<&str>, path: &str) -> Result<Option<SyncDocument>> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.fail_fetch {
            return Err(Error::Transport);
        }
        self.document_bytes(path).map(codec::decode).transpose()
    }

    fn put(&mut self, path: &str, doc: &SyncDocument) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        let encoded = codec::encode(doc)?;
        // Listeners see what went over the wire, not the caller's struct
        let delivered = codec::decode(&encoded)?;
        self.store(path, encoded)?;
        self.notify(DataEvent::changed(path, delivered)?);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<DataEvent> {
        self.events.pop_front()
    }
}
