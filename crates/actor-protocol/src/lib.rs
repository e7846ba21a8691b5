//! # Actor Protocol
//!
//! Type-safe message definitions for the CTD driver actor system.
//!
//! This crate has no I/O and no async runtime dependency, so everything in it
//! is testable as plain Rust.
//!
//! ## Architecture
//!
//! - **LinkStatus**: Transport → Driver (link came up / went away)
//! - **CtdControl**: Operator → Driver (desired logging mode)
//! - **SystemEvent**: Actor System → observers (state entry/exit, diagnostics)
//! - **LoggingPhase / LoggingEvent**: the device logging cycle and its
//!   transition table (pure logic, no side effects)
//!
//! ## Message Flow
//!
//! ```text
//! Transport ─ LinkStatus / lines ─┐
//!                                  ├─► DriverActor ─► PortMessage::Write ─► Transport
//! Operator ─ CtdControl ───────────┘        │
//!                                           └─► SystemEvent ─► observers
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod errors;
pub mod messages;
pub mod state;

pub use errors::ActorError;
pub use messages::{CtdControl, DesiredState, DeviceCommand, LinkStatus, SystemEvent};
pub use state::{step, LoggingEvent, LoggingPhase, SideEffect};
