//! Runs companion commands against a sync channel and a forecast store.

use heapless::Deque;

use super::{
    forecast::ForecastStore,
    machine::{Command, Companion, CompanionEvent},
    CompanionConfig,
};
use crate::sync::{SyncChannel, SYNC_PATH};

/// Maximum number of queued result events.
pub const EVENT_QUEUE_LEN: usize = 8;

/// Companion bound to a channel and store.
///
/// Command results are queued as events and processed in order until the
/// queue is empty.
pub struct CompanionDriver<C: SyncChannel, S: ForecastStore> {
    companion: Companion,
    channel: C,
    store: S,
    events: Deque<CompanionEvent, EVENT_QUEUE_LEN>,
}

impl<C: SyncChannel, S: ForecastStore> CompanionDriver<C, S> {
    pub fn new(config: CompanionConfig, channel: C, store: S) -> Self {
        Self {
            companion: Companion::new(config),
            channel,
            store,
            events: Deque::new(),
        }
    }

    pub fn companion(&self) -> &Companion {
        &self.companion
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Feed one user or host event and run until idle.
    pub fn handle(&mut self, event: CompanionEvent, now_ms: i64) {
        self.enqueue(event);
        while let Some(event) = self.events.pop_front() {
            for command in self.companion.handle(event, now_ms) {
                if let Some(result) = self.run(command) {
                    self.enqueue(result);
                }
            }
        }
    }

    fn enqueue(&mut self, event: CompanionEvent) {
        if self.events.push_back(event).is_err() {
            error!("companion event queue full");
        }
    }

    fn run(&mut self, command: Command) -> Option<CompanionEvent> {
        trace!("command {:?}", command);
        match command {
            Command::Connect => Some(match self.channel.connect() {
                Ok(()) => CompanionEvent::Connected,
                Err(_) => CompanionEvent::ConnectionFailed,
            }),
            Command::Disconnect => {
                self.channel.disconnect();
                None
            }
            Command::FetchPeerDocument { peer, path } => {
                let result = self.channel.fetch(Some(peer.as_str()), path.as_str());
                Some(CompanionEvent::PeerDocumentFetched(result))
            }
            Command::QueryForecast(query) => {
                let row = self.store.query(&query).unwrap_or_else(|e| {
                    warn!("forecast query: {:?}", e);
                    None
                });
                Some(CompanionEvent::ForecastLoaded(row))
            }
            Command::PutDocument(doc) => Some(CompanionEvent::DocumentPut(
                self.channel.put(SYNC_PATH, &doc),
            )),
        }
    }
}
