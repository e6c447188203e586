//! # playback-events
//!
//! Timer-driven event dispatch core for a legacy game playback engine.
//!
//! The game ran its effects from hardware timer interrupts. Here
//! they are periodic callback nodes driven by a fixed 50 Hz virtual clock:
//! the host loop calls [`EventsManager::poll_events`], and every elapsed
//! 20 ms frame runs one dispatch pass over the active nodes.
//!
//! ## Architecture
//!
//! ```text
//! HostInput ─┐                      ┌─ fade / fade levels / flash
//!            ├─ EventsManager ──────┼─ color cycling
//! FrameClock ┘   (frame pass)       ├─ cursor blink, master clock
//!                                   └─ video timer → EngineHooks
//! ```
//!
//! The dispatch core has no error channel. Invalid requests are ignored and
//! logged through the `log` facade; resource decoding returns
//! [`ResourceError`].
//!
//! ## Modules
//!
//! - [`scheduler`] - `IntNode`, `NodeId`, `Handler`, the active list
//! - [`events`] - `EventsManager`
//! - [`data`] - `IntData`, the shared fade/flip/palette context
//! - [`fade`] - Palette fades, brightness levels, flash
//! - [`cycle`] - Four-slot color cycling
//! - [`state`] - Mouse and cursor state
//! - [`input`] - Host input sources (crossterm, scripted)
//! - [`clock`] - Wall-clock sources
//! - [`resources`] - Decoded color maps, pictures, cycle descriptors

pub mod clock;
pub mod config;
pub mod cycle;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod fade;
pub mod input;
pub mod resources;
pub mod scheduler;
pub mod state;
pub mod types;

pub use clock::{FrameClock, ManualClock, SystemClock};
pub use config::EventsConfig;
pub use data::{DataSlot, IntData};
pub use engine::{EngineHooks, EventKind, EventRecord, NullEngine};
pub use error::ResourceError;
pub use events::{EventsManager, WaitOutcome};
pub use fade::{FadeLevels, FadeState, LevelDirection};
pub use input::{HostEvent, HostInput, MouseButton, ScriptedInput};
pub use resources::{CMapResource, CycleResource, CycleSlot, PictureResource};
pub use scheduler::{Handler, IntNode, NodeId};
pub use types::*;
