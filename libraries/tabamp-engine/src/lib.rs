//! Tabamp engine
//!
//! The control plane of the per-tab loudness engine: discovers audio
//! sources, binds them to processing chains, guards against protected
//! content, and dispatches settings changes. Everything is single-threaded
//! and event-driven; audio flows through the chains autonomously while
//! this crate only reacts to discrete control and lifecycle events.
//!
//! The embedder supplies a [`MediaHost`] implementation and feeds
//! [`SourceEvent`]s into a [`ProcessingController`]; the controller answers
//! with [`EngineEvent`]s drained after each call.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabamp_engine::{MixingLayout, ProcessingController, SourceEvent};
//!
//! let mut controller = ProcessingController::new(host, MixingLayout::PerSource, false);
//! controller.scan();
//! controller.set_volume_percent(150);
//!
//! for event in controller.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binder;
mod bus;
mod capability;
mod controller;
mod error;
mod events;
mod host;

pub use binder::{BindOutcome, MixingLayout, SourceBinder, MAX_BIND_ATTEMPTS};
pub use bus::MasterBus;
pub use capability::CapabilityGuard;
pub use controller::{EngineState, ProcessingController};
pub use error::{TapError, TapResult};
pub use events::{CapabilityCallback, EngineEvent, SourceEvent};
pub use host::MediaHost;
