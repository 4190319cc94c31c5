//! Watch-face state machine.
//!
//! Host callbacks come in as [`HostEvent`]s, the engine updates its own
//! state and answers with [`Effect`]s for the host to carry out (connect the
//! sync channel, schedule the redraw tick, invalidate the frame, ...).

use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use heapless::Vec;

use super::{
    clock::{local_time, ClockState},
    paint::RenderState,
    render::draw_face,
    timer::next_tick_delay_ms,
};
use crate::config::DEFAULT_UTC_OFFSET_SECS;
use crate::sync::{DataEvent, SyncDocument, SYNC_PATH};
use crate::weather::WeatherSnapshot;

/// Maximum number of effects produced by a single event.
pub const MAX_EFFECTS: usize = 8;

pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// Visible state of the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceState {
    Hidden,
    VisibleInteractive,
    VisibleAmbient,
}

/// Phase of a touch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapKind {
    /// Finger down.
    Touch,
    /// Gesture turned into something else.
    TouchCancel,
    /// Completed tap.
    Tap,
}

/// Callbacks delivered by the host.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged { low_bit_ambient: bool },
    Tap(TapKind),
    /// New UTC offset in seconds.
    TimeZoneChanged(i32),
    /// Host-driven minute tick (ambient mode).
    TimeTick,
    /// The interactive redraw tick is due.
    TimerFired { now_ms: i64 },
    SyncConnected,
    SyncSuspended(i32),
    SyncFailed,
    /// Result of the one-off fetch issued on connect.
    DocumentFetched(Option<SyncDocument>),
    DataChanged(DataEvent),
}

/// Requests to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    ConnectSync,
    DisconnectSync,
    AddDataListener,
    RemoveDataListener,
    FetchDocument,
    RegisterTimeZoneReceiver,
    UnregisterTimeZoneReceiver,
    ScheduleTick { delay_ms: u64 },
    CancelTick,
    Invalidate,
}

/// Watch-face engine. Owns render state, weather and clock settings.
#[derive(Debug, Clone)]
pub struct WatchFaceEngine {
    visible: bool,
    render: RenderState,
    weather: WeatherSnapshot,
    utc_offset_secs: i32,
    default_utc_offset_secs: i32,
    time_zone_receiver: bool,
    sync_connected: bool,
}

impl Default for WatchFaceEngine {
    fn default() -> Self {
        Self::new(DEFAULT_UTC_OFFSET_SECS)
    }
}

impl WatchFaceEngine {
    pub fn new(default_utc_offset_secs: i32) -> Self {
        Self {
            visible: false,
            render: RenderState::default(),
            weather: WeatherSnapshot::default(),
            utc_offset_secs: default_utc_offset_secs,
            default_utc_offset_secs,
            time_zone_receiver: false,
            sync_connected: false,
        }
    }

    pub fn state(&self) -> FaceState {
        match (self.visible, self.render.ambient) {
            (false, _) => FaceState::Hidden,
            (true, false) => FaceState::VisibleInteractive,
            (true, true) => FaceState::VisibleAmbient,
        }
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }

    pub fn is_sync_connected(&self) -> bool {
        self.sync_connected
    }

    /// The 1 Hz tick runs only while visible and interactive.
    pub fn should_timer_run(&self) -> bool {
        self.visible && !self.render.ambient
    }

    /// Process one host event.
    pub fn handle(&mut self, event: HostEvent) -> Effects {
        let mut fx = Effects::new();

        match event {
            HostEvent::VisibilityChanged(true) => {
                if !self.visible {
                    self.visible = true;
                    push(&mut fx, Effect::ConnectSync);
                    if !self.time_zone_receiver {
                        self.time_zone_receiver = true;
                        push(&mut fx, Effect::RegisterTimeZoneReceiver);
                    }
                    // Zone may have changed while hidden
                    self.utc_offset_secs = self.default_utc_offset_secs;
                }
                self.update_timer(&mut fx);
            }
            HostEvent::VisibilityChanged(false) => {
                self.visible = false;
                if self.time_zone_receiver {
                    self.time_zone_receiver = false;
                    push(&mut fx, Effect::UnregisterTimeZoneReceiver);
                }
                if self.sync_connected {
                    self.sync_connected = false;
                    push(&mut fx, Effect::RemoveDataListener);
                    push(&mut fx, Effect::DisconnectSync);
                }
                self.update_timer(&mut fx);
            }
            HostEvent::AmbientModeChanged(ambient) => {
                if self.render.set_ambient(ambient) {
                    debug!("ambient mode: {}", ambient);
                    push(&mut fx, Effect::Invalidate);
                }
                self.update_timer(&mut fx);
            }
            HostEvent::PropertiesChanged { low_bit_ambient } => {
                self.render.low_bit_ambient = low_bit_ambient;
            }
            HostEvent::Tap(TapKind::Tap) => {
                self.render.tap();
                push(&mut fx, Effect::Invalidate);
            }
            HostEvent::Tap(TapKind::Touch | TapKind::TouchCancel) => {}
            HostEvent::TimeZoneChanged(offset) => {
                self.utc_offset_secs = offset;
                push(&mut fx, Effect::Invalidate);
            }
            HostEvent::TimeTick => push(&mut fx, Effect::Invalidate),
            HostEvent::TimerFired { now_ms } => {
                push(&mut fx, Effect::Invalidate);
                if self.should_timer_run() {
                    push(
                        &mut fx,
                        Effect::ScheduleTick {
                            delay_ms: next_tick_delay_ms(now_ms),
                        },
                    );
                }
            }
            HostEvent::SyncConnected => {
                if self.visible {
                    info!("sync channel connected");
                    self.sync_connected = true;
                    push(&mut fx, Effect::AddDataListener);
                    // Covers a phone write that landed before we connected
                    push(&mut fx, Effect::FetchDocument);
                } else {
                    push(&mut fx, Effect::DisconnectSync);
                }
            }
            HostEvent::SyncSuspended(cause) => {
                warn!("sync channel suspended: {}", cause);
            }
            HostEvent::SyncFailed => {
                warn!("sync channel connection failed");
                self.sync_connected = false;
            }
            HostEvent::DocumentFetched(Some(doc)) => self.apply(&doc, &mut fx),
            HostEvent::DocumentFetched(None) => debug!("no weather document stored yet"),
            HostEvent::DataChanged(event) => {
                if event.is_change_for(SYNC_PATH) {
                    self.apply(&event.document, &mut fx);
                } else {
                    trace!("ignoring data event for {}", event.path.as_str());
                }
            }
        }

        fx
    }

    /// Clock state for the frame drawn at `now_ms`.
    pub fn clock_state(&self, now_ms: i64) -> ClockState {
        let local = local_time(now_ms, self.utc_offset_secs).unwrap_or_default();
        ClockState::at(local, self.render.ambient, self.render.tap_count)
    }

    /// Draw the face as of `now_ms`.
    pub fn draw<D>(&self, target: &mut D, now_ms: i64) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        draw_face(
            target,
            &self.render,
            &self.weather,
            &self.clock_state(now_ms),
        )
    }

    fn apply(&mut self, doc: &SyncDocument, fx: &mut Effects) {
        if self.weather.apply(doc) {
            debug!("weather updated: code {}", self.weather.condition_code);
            push(fx, Effect::Invalidate);
        }
    }

    fn update_timer(&self, fx: &mut Effects) {
        push(fx, Effect::CancelTick);
        if self.should_timer_run() {
            push(fx, Effect::ScheduleTick { delay_ms: 0 });
        }
    }
}

fn push(fx: &mut Effects, effect: Effect) {
    if fx.push(effect).is_err() {
        error!("effect queue full, dropping {:?}", effect);
    }
}
