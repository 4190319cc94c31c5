//! Runs engine effects against a sync channel and the redraw timer.

use embedded_graphics::{pixelcolor::Rgb565, prelude::DrawTarget};
use heapless::Deque;

use super::{
    engine::{Effect, HostEvent, WatchFaceEngine},
    timer::UpdateTimer,
};
use crate::sync::{SyncChannel, SYNC_PATH};

/// Follow-up events produced while executing effects.
const FOLLOW_UP_LEN: usize = 4;

/// Watch face bound to a sync channel.
///
/// The host feeds callbacks through [`dispatch`](Self::dispatch), calls
/// [`poll`](Self::poll) from its main loop and redraws whenever
/// [`take_redraw`](Self::take_redraw) says so.
pub struct WatchFaceService<C: SyncChannel> {
    engine: WatchFaceEngine,
    channel: C,
    timer: UpdateTimer,
    redraw: bool,
}

impl<C: SyncChannel> WatchFaceService<C> {
    pub fn new(channel: C, default_utc_offset_secs: i32) -> Self {
        Self {
            engine: WatchFaceEngine::new(default_utc_offset_secs),
            channel,
            timer: UpdateTimer::new(),
            // First frame
            redraw: true,
        }
    }

    pub fn engine(&self) -> &WatchFaceEngine {
        &self.engine
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn timer(&self) -> &UpdateTimer {
        &self.timer
    }

    /// Feed one host event and run everything it causes.
    pub fn dispatch(&mut self, event: HostEvent, now_ms: i64) {
        let mut pending: Deque<HostEvent, FOLLOW_UP_LEN> = Deque::new();
        let mut next = Some(event);

        while let Some(event) = next {
            for effect in self.engine.handle(event) {
                if let Some(follow_up) = self.run(effect, now_ms) {
                    if pending.push_back(follow_up).is_err() {
                        error!("follow-up queue full");
                    }
                }
            }
            next = pending.pop_front();
        }
    }

    /// Deliver queued change events and fire the tick if it is due.
    pub fn poll(&mut self, now_ms: i64) {
        while let Some(event) = self.channel.poll_event() {
            self.dispatch(HostEvent::DataChanged(event), now_ms);
        }
        if self.timer.fire(now_ms) {
            self.dispatch(HostEvent::TimerFired { now_ms }, now_ms);
        }
    }

    /// `true` once after the face was invalidated.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }

    pub fn draw<D>(&self, target: &mut D, now_ms: i64) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.engine.draw(target, now_ms)
    }

    fn run(&mut self, effect: Effect, now_ms: i64) -> Option<HostEvent> {
        trace!("effect {:?}", effect);
        match effect {
            Effect::ConnectSync => match self.channel.connect() {
                Ok(()) => return Some(HostEvent::SyncConnected),
                Err(e) => {
                    warn!("sync connect: {:?}", e);
                    return Some(HostEvent::SyncFailed);
                }
            },
            Effect::DisconnectSync => self.channel.disconnect(),
            Effect::AddDataListener => {
                if let Err(e) = self.channel.add_listener(SYNC_PATH) {
                    warn!("add listener: {:?}", e);
                }
            }
            Effect::RemoveDataListener => self.channel.remove_listener(SYNC_PATH),
            Effect::FetchDocument => match self.channel.fetch(None, SYNC_PATH) {
                Ok(doc) => return Some(HostEvent::DocumentFetched(doc)),
                Err(e) => warn!("fetch {}: {:?}", SYNC_PATH, e),
            },
            // Zone changes reach us as TimeZoneChanged events from the host
            Effect::RegisterTimeZoneReceiver => debug!("time zone receiver registered"),
            Effect::UnregisterTimeZoneReceiver => debug!("time zone receiver unregistered"),
            Effect::ScheduleTick { delay_ms } => self.timer.schedule(now_ms, delay_ms),
            Effect::CancelTick => self.timer.cancel(),
            Effect::Invalidate => self.redraw = true,
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::engine::{FaceState, TapKind};
    use crate::face::render::Frame;
    use crate::sync::{codec, MemoryChannel, SyncDocument};
    use crate::weather::IconKind;

    fn stored(doc: &SyncDocument) -> MemoryChannel {
        let mut channel = MemoryChannel::new();
        channel
            .receive(SYNC_PATH, &codec::encode(doc).unwrap())
            .unwrap();
        channel
    }

    #[test]
    fn becoming_visible_loads_stored_document() {
        let doc = SyncDocument::full("10115", 5_000, 300, 12.0, 4.0).unwrap();
        let mut service = WatchFaceService::new(stored(&doc), 0);
        service.take_redraw();

        service.dispatch(HostEvent::VisibilityChanged(true), 0);

        assert!(service.channel().is_connected());
        assert!(service.engine().is_sync_connected());
        assert_eq!(service.engine().weather().icon, IconKind::LightRain);
        assert_eq!(service.engine().weather().location.as_str(), "10115");
        assert!(service.take_redraw());
        assert!(!service.take_redraw());
    }

    #[test]
    fn tick_runs_once_per_second_while_interactive() {
        let mut service = WatchFaceService::new(MemoryChannel::new(), 0);
        service.dispatch(HostEvent::VisibilityChanged(true), 100);
        assert_eq!(service.timer().deadline_ms(), Some(100));

        service.take_redraw();
        service.poll(100);
        assert!(service.take_redraw());
        assert_eq!(service.timer().deadline_ms(), Some(1_000));

        service.poll(999);
        assert!(!service.take_redraw());
        service.poll(1_000);
        assert!(service.take_redraw());
        assert_eq!(service.timer().deadline_ms(), Some(2_000));
    }

    #[test]
    fn no_tick_while_ambient_or_hidden() {
        let mut service = WatchFaceService::new(MemoryChannel::new(), 0);
        service.dispatch(HostEvent::VisibilityChanged(true), 0);

        service.dispatch(HostEvent::AmbientModeChanged(true), 0);
        assert!(!service.timer().is_pending());

        service.dispatch(HostEvent::AmbientModeChanged(false), 0);
        assert!(service.timer().is_pending());

        service.dispatch(HostEvent::VisibilityChanged(false), 0);
        assert!(!service.timer().is_pending());
        assert!(!service.channel().is_connected());
        assert_eq!(service.engine().state(), FaceState::Hidden);
    }

    #[test]
    fn remote_change_is_applied_on_poll() {
        let mut service = WatchFaceService::new(MemoryChannel::new(), 0);
        service.dispatch(HostEvent::VisibilityChanged(true), 0);
        service.dispatch(HostEvent::AmbientModeChanged(true), 0);
        service.take_redraw();

        let partial = SyncDocument {
            max_temp: Some(30.0),
            ..Default::default()
        };
        service
            .channel_mut()
            .receive(SYNC_PATH, &codec::encode(&partial).unwrap())
            .unwrap();
        service.poll(0);

        assert_eq!(service.engine().weather().high, 30.0);
        assert_eq!(service.engine().weather().condition_code, 800);
        assert!(service.take_redraw());
    }

    #[test]
    fn refused_connection_keeps_defaults() {
        let mut channel = MemoryChannel::new();
        channel.refuse_connections(true);
        let mut service = WatchFaceService::new(channel, 0);

        service.dispatch(HostEvent::VisibilityChanged(true), 0);

        assert!(!service.engine().is_sync_connected());
        assert_eq!(service.engine().weather().high, 25.0);
        assert!(service.timer().is_pending());
    }

    #[test]
    fn failed_fetch_still_listens() {
        let mut channel = MemoryChannel::new();
        channel.fail_fetches(true);
        let mut service = WatchFaceService::new(channel, 0);
        service.dispatch(HostEvent::VisibilityChanged(true), 0);

        service
            .channel_mut()
            .receive(
                SYNC_PATH,
                &codec::encode(&SyncDocument::full("94043", 0, 801, 20.0, 10.0).unwrap())
                    .unwrap(),
            )
            .unwrap();
        service.poll(0);

        assert_eq!(service.engine().weather().icon, IconKind::LightClouds);
    }

    #[test]
    fn draw_reflects_tap_background() {
        let mut service = WatchFaceService::new(MemoryChannel::new(), 0);
        service.dispatch(HostEvent::VisibilityChanged(true), 0);
        service.dispatch(HostEvent::Tap(TapKind::Tap), 0);

        let mut frame = Box::new(Frame::<240, 240>::new(Rgb565::new(0, 0, 0)));
        service.draw(frame.as_mut(), 0).unwrap();

        assert_eq!(
            frame.pixel(embedded_graphics::geometry::Point::new(0, 0)),
            Some(crate::config::BACKGROUND_DARK)
        );
    }
}
