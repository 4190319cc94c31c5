//! Sunshine weather watch face.
//!
//! Pure logic shared by the PineTime firmware (`src/main.rs`) and the host
//! tests: the condition-code icon table, the `/sunshine` sync document and
//! its wire codec, the analog face engine and renderer, and the phone-side
//! companion state machine.
//!
//! Usage: `cargo test` on the host, `cargo build --release --features
//! embedded --target thumbv7em-none-eabihf` for the watch.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module below
#[macro_use]
mod fmt;

pub mod companion;
pub mod config;
pub mod error;
pub mod face;
pub mod power;
pub mod sync;
pub mod time;
pub mod weather;

pub use error::{CodecError, Error, Result};
