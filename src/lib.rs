//! # gyverlamp_rs
//!
//! An async Rust library for controlling GyverLamp LED lamps over UDP.
//!
//! A [`Lamp`] turns high-level intents (power, brightness, color, effect)
//! into the lamp's text commands, and polls the lamp to keep a local mirror
//! of its state. The crate has no opinion on how often to poll or where
//! state changes go; the host integration drives [`Lamp::poll`] and can
//! register a [`StateObserver`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use gyverlamp_rs::{HueSaturation, Lamp, LampConfig, TurnOnRequest};
//!
//! async fn control_lamp() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut lamp = Lamp::connect(&LampConfig::new("192.168.1.50")).await?;
//!     lamp.poll().await;
//!
//!     let mut request = TurnOnRequest::new();
//!     request.brightness(128);
//!     request.hue_saturation(&HueSaturation::create(200.0, 80.0).unwrap());
//!     lamp.turn_on(&request).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Effects**: select by name through an [`EffectRegistry`] built from the
//!   firmware defaults ([`DefaultEffect`]) and user overrides, with optional
//!   random selection
//! - **Hue/Saturation**: the only color mode, see [`HueSaturation`]
//! - **Availability**: three failed polls in a row mark the lamp unavailable;
//!   one good poll brings it back
//! - **Diagnostics**: message history and a JSON snapshot via
//!   [`Lamp::diagnostics`]
//!
//! ## Communication
//!
//! Lamps listen on UDP port 8888. Each command is one ASCII datagram and the
//! lamp answers every datagram once. Replies are awaited for at most five
//! seconds.
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

mod command;
mod config;
mod effects;
mod errors;
mod history;
mod lamp;
mod request;
pub mod runtime;
mod state;
mod transport;
mod types;

// Re-export public API
pub use command::Command;
pub use config::{DEFAULT_NAME, DeviceAddress, DeviceInfo, EffectMapping, LampConfig};
pub use effects::EffectRegistry;
pub use errors::Error;
pub use history::{HistoryEntry, HistorySummary, MessageHistory, MessageType};
pub use lamp::{Lamp, PollOutcome, StateObserver};
pub use request::TurnOnRequest;
pub use state::{LampState, StatusReport};
pub use transport::{Transport, UdpTransport};
pub use types::{DefaultEffect, HueSaturation};
