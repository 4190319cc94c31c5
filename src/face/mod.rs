//! Watch-side analog face: hand geometry, render state, drawing, the redraw
//! timer and the state machine that ties them to the sync channel.

pub mod clock;
pub mod engine;
pub mod paint;
pub mod render;
pub mod service;
pub mod timer;

pub use clock::ClockState;
pub use engine::{Effect, FaceState, HostEvent, TapKind, WatchFaceEngine};
pub use paint::{HandPaint, RenderState};
pub use render::{draw_face, Frame};
pub use service::WatchFaceService;
pub use timer::UpdateTimer;
