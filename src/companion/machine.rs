//! Companion screen state machine.
//!
//! Each step is a function of the current state and one event. The caller
//! executes the returned commands and feeds their results back as events.

use heapless::Vec;

use super::{
    forecast::{ForecastQuery, ForecastRow},
    view::{CompanionView, Notice},
    CompanionConfig, PeerId,
};
use crate::error::Result;
use crate::sync::{path_from, DataPath, SyncDocument, SYNC_PATH};

/// Maximum number of commands produced by a single event.
pub const MAX_COMMANDS: usize = 4;

pub type Commands = Vec<Command, MAX_COMMANDS>;

/// Companion states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompanionState {
    /// Screen not shown, results are discarded
    Stopped,
    /// Waiting for the sync channel
    Connecting,
    /// Reading the document last written for the peer
    FetchingPeerDocument,
    /// Forecast query in flight
    Loading,
    /// Idle, refresh available
    Ready,
}

/// Inputs of the companion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompanionEvent {
    Start,
    Stop,
    Connected,
    ConnectionSuspended(i32),
    ConnectionFailed,
    PeerDocumentFetched(Result<Option<SyncDocument>>),
    ForecastLoaded(Option<ForecastRow>),
    DocumentPut(Result<()>),
    RefreshPressed,
    DialogAcknowledged,
}

/// Requests to the host
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Connect,
    Disconnect,
    FetchPeerDocument { peer: PeerId, path: DataPath },
    QueryForecast(ForecastQuery),
    /// Replace the document at the sync path
    PutDocument(SyncDocument),
}

pub struct Companion {
    config: CompanionConfig,
    state: CompanionState,
    view: CompanionView,
    connected: bool,
}

impl Companion {
    pub fn new(config: CompanionConfig) -> Self {
        let view = CompanionView::new(
            config.watch_face_component.clone(),
            config.preferred_location.clone(),
        );
        Self {
            config,
            state: CompanionState::Stopped,
            view,
            connected: false,
        }
    }

    pub fn state(&self) -> CompanionState {
        self.state
    }

    pub fn view(&self) -> &CompanionView {
        &self.view
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    /// Process one event at wall-clock time `now_ms`.
    pub fn handle(&mut self, event: CompanionEvent, now_ms: i64) -> Commands {
        use CompanionEvent::*;
        use CompanionState::*;

        let mut cmds = Commands::new();

        match (self.state, event) {
            (Stopped, Start) => {
                self.state = Connecting;
                push(&mut cmds, Command::Connect);
            }
            (Stopped, Connected) => {
                debug!("connected after stop, disconnecting");
                push(&mut cmds, Command::Disconnect);
            }
            (Stopped, event) => trace!("companion stopped, discarding {:?}", event),
            (_, Start) => {}

            (_, Stop) => {
                if self.connected {
                    self.connected = false;
                    push(&mut cmds, Command::Disconnect);
                }
                self.view.refresh_enabled = false;
                self.state = Stopped;
            }

            (Connecting, Connected) => {
                self.connected = true;
                match self.config.peer_id.clone() {
                    Some(peer) => match path_from(SYNC_PATH) {
                        Ok(path) => {
                            self.state = FetchingPeerDocument;
                            push(&mut cmds, Command::FetchPeerDocument { peer, path });
                        }
                        Err(e) => {
                            error!("sync path: {:?}", e);
                            self.fall_back_to_defaults();
                            self.start_query(now_ms, &mut cmds);
                        }
                    },
                    None => {
                        info!("no peer known");
                        self.fall_back_to_defaults();
                        self.view.datetime = Some(now_ms);
                        self.view.refresh_enabled = true;
                        self.state = Ready;
                    }
                }
            }
            (_, Connected) => self.connected = true,
            (_, ConnectionSuspended(cause)) => debug!("connection suspended: {}", cause),
            (_, ConnectionFailed) => {
                warn!("connection failed");
                self.connected = false;
            }

            (FetchingPeerDocument, PeerDocumentFetched(result)) => {
                match result {
                    Ok(Some(doc)) => {
                        let default = self.config.preferred_location.clone();
                        self.view.show_document(Some(&doc), &default);
                    }
                    Ok(None) => {
                        debug!("peer has no document yet");
                        self.fall_back_to_defaults();
                    }
                    Err(e) => {
                        warn!("peer document fetch: {:?}", e);
                        self.fall_back_to_defaults();
                    }
                }
                self.start_query(now_ms, &mut cmds);
            }

            (Loading, ForecastLoaded(row)) => {
                if let Some(row) = row {
                    debug!("forecast row {}", row.id);
                    self.view.show_row(&row);
                    match self.document_for(&row) {
                        Ok(doc) => push(&mut cmds, Command::PutDocument(doc)),
                        Err(e) => warn!("building document: {:?}", e),
                    }
                }
                self.view.refresh_enabled = true;
                self.state = Ready;
            }

            (_, DocumentPut(Ok(()))) => debug!("document written to {}", SYNC_PATH),
            (_, DocumentPut(Err(e))) => warn!("document write: {:?}", e),

            (Ready, RefreshPressed) => self.start_query(now_ms, &mut cmds),

            (_, DialogAcknowledged) => self.view.notice = None,

            (state, event) => trace!("ignoring {:?} in {:?}", event, state),
        }

        cmds
    }

    fn fall_back_to_defaults(&mut self) {
        let default = self.config.preferred_location.clone();
        self.view.show_document(None, &default);
        self.view.notice = Some(Notice::NoDeviceConnected);
    }

    /// Query today's forecast for the location on screen.
    fn start_query(&mut self, now_ms: i64, cmds: &mut Commands) {
        self.state = CompanionState::Loading;
        self.view.refresh_enabled = false;
        self.view.datetime = Some(now_ms);
        push(
            cmds,
            Command::QueryForecast(ForecastQuery {
                location: self.view.location.clone(),
                date_ms: now_ms,
            }),
        );
    }

    fn document_for(&self, row: &ForecastRow) -> Result<SyncDocument> {
        SyncDocument::full(
            self.view.location.as_str(),
            self.view.datetime.unwrap_or_default(),
            row.condition_code,
            row.max_temp,
            row.min_temp,
        )
    }
}

fn push(cmds: &mut Commands, cmd: Command) {
    if cmds.push(cmd).is_err() {
        error!("command queue full");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const NOW: i64 = 1_700_000_000_000;

    fn companion(peer: Option<&str>) -> Companion {
        Companion::new(CompanionConfig::new(peer, "94043", "SunshineWatchFace").unwrap())
    }

    fn row() -> ForecastRow {
        ForecastRow {
            id: 7,
            condition_code: 501,
            max_temp: 21.5,
            min_temp: 11.0,
        }
    }

    fn connected(peer: Option<&str>) -> (Companion, Commands) {
        let mut c = companion(peer);
        assert_eq!(c.handle(CompanionEvent::Start, NOW).as_slice(), &[Command::Connect]);
        let cmds = c.handle(CompanionEvent::Connected, NOW);
        (c, cmds)
    }

    /// Connected with a peer that has no document yet, query in flight.
    fn loading() -> Companion {
        let (mut c, _) = connected(Some("watch-1"));
        c.handle(CompanionEvent::PeerDocumentFetched(Ok(None)), NOW);
        c
    }

    fn query(cmds: &Commands) -> &ForecastQuery {
        match cmds.as_slice() {
            [Command::QueryForecast(q)] => q,
            other => panic!("expected a query, got {:?}", other),
        }
    }

    #[test]
    fn known_peer_fetches_document_first() {
        let (c, cmds) = connected(Some("watch-1"));
        assert_eq!(c.state(), CompanionState::FetchingPeerDocument);
        match cmds.as_slice() {
            [Command::FetchPeerDocument { peer, path }] => {
                assert_eq!(peer.as_str(), "watch-1");
                assert_eq!(path.as_str(), SYNC_PATH);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn no_peer_shows_notice_without_querying() {
        let (c, cmds) = connected(None);
        assert!(cmds.is_empty());
        assert_eq!(c.view().notice, Some(Notice::NoDeviceConnected));
        assert_eq!(c.state(), CompanionState::Ready);
        assert!(c.view().refresh_enabled);
        assert_eq!(c.view().location.as_str(), "94043");
        assert_eq!(c.view().datetime, Some(NOW));
        assert_eq!(c.view().forecast, None);
    }

    #[test]
    fn fetched_location_is_used_for_query() {
        let (mut c, _) = connected(Some("watch-1"));
        let doc = SyncDocument::full("10115", 1_000, 800, 5.0, 1.0).unwrap();
        let cmds = c.handle(CompanionEvent::PeerDocumentFetched(Ok(Some(doc))), NOW);

        assert_eq!(query(&cmds).location.as_str(), "10115");
        assert_eq!(c.view().notice, None);
        assert_eq!(c.view().datetime, Some(NOW));
        assert_eq!(c.view().high, Some(5.0));
    }

    #[test]
    fn failed_or_empty_fetch_falls_back_with_notice() {
        for result in [Ok(None), Err(Error::Transport)] {
            let (mut c, _) = connected(Some("watch-1"));
            let cmds = c.handle(CompanionEvent::PeerDocumentFetched(result), NOW);
            assert_eq!(query(&cmds).location.as_str(), "94043");
            assert_eq!(c.view().notice, Some(Notice::NoDeviceConnected));
            assert_eq!(c.view().high, None);
        }
    }

    #[test]
    fn first_row_writes_full_document() {
        let mut c = loading();
        let cmds = c.handle(CompanionEvent::ForecastLoaded(Some(row())), NOW + 5);

        let expected = SyncDocument::full("94043", NOW, 501, 21.5, 11.0).unwrap();
        assert_eq!(cmds.as_slice(), &[Command::PutDocument(expected)]);
        assert_eq!(c.state(), CompanionState::Ready);
        assert!(c.view().refresh_enabled);
        assert_eq!(c.view().forecast, Some(501));
    }

    #[test]
    fn empty_result_writes_nothing() {
        let mut c = loading();
        let cmds = c.handle(CompanionEvent::ForecastLoaded(None), NOW);
        assert!(cmds.is_empty());
        assert!(c.view().refresh_enabled);
        assert_eq!(c.view().forecast, None);
    }

    #[test]
    fn refresh_requeries_without_fetching_and_disables_itself() {
        let (mut c, _) = connected(Some("watch-1"));
        c.handle(CompanionEvent::PeerDocumentFetched(Ok(None)), NOW);
        c.handle(CompanionEvent::ForecastLoaded(Some(row())), NOW);

        let cmds = c.handle(CompanionEvent::RefreshPressed, NOW + 60_000);
        assert_eq!(query(&cmds).date_ms, NOW + 60_000);
        assert!(!c.view().refresh_enabled);

        // A second press while loading does nothing
        assert!(c.handle(CompanionEvent::RefreshPressed, NOW).is_empty());
    }

    #[test]
    fn results_after_stop_are_discarded() {
        let mut c = loading();
        assert_eq!(c.handle(CompanionEvent::Stop, NOW).as_slice(), &[Command::Disconnect]);

        let cmds = c.handle(CompanionEvent::ForecastLoaded(Some(row())), NOW);
        assert!(cmds.is_empty());
        assert_eq!(c.state(), CompanionState::Stopped);
        assert_eq!(c.view().forecast, None);
    }

    #[test]
    fn stop_before_connect_does_not_disconnect() {
        let mut c = companion(None);
        c.handle(CompanionEvent::Start, NOW);
        assert!(c.handle(CompanionEvent::Stop, NOW).is_empty());
    }

    #[test]
    fn connection_completing_after_stop_is_closed() {
        let mut c = companion(Some("watch-1"));
        c.handle(CompanionEvent::Start, NOW);
        assert!(c.handle(CompanionEvent::Stop, NOW).is_empty());

        let cmds = c.handle(CompanionEvent::Connected, NOW);
        assert_eq!(cmds.as_slice(), &[Command::Disconnect]);
        assert_eq!(c.state(), CompanionState::Stopped);
    }

    #[test]
    fn refresh_without_peer_queries_default_location() {
        let (mut c, _) = connected(None);
        let cmds = c.handle(CompanionEvent::RefreshPressed, NOW + 1);
        assert_eq!(query(&cmds).location.as_str(), "94043");
        assert_eq!(c.state(), CompanionState::Loading);
    }

    #[test]
    fn acknowledging_clears_notice() {
        let (mut c, _) = connected(None);
        c.handle(CompanionEvent::DialogAcknowledged, NOW);
        assert_eq!(c.view().notice, None);
    }

    #[test]
    fn connection_failure_is_only_logged() {
        let mut c = companion(None);
        c.handle(CompanionEvent::Start, NOW);
        assert!(c.handle(CompanionEvent::ConnectionFailed, NOW).is_empty());
        assert!(c.handle(CompanionEvent::ConnectionSuspended(1), NOW).is_empty());
        assert_eq!(c.state(), CompanionState::Connecting);
    }
}
