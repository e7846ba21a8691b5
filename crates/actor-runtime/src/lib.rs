//! # Actor Runtime
//!
//! Provides the runtime infrastructure for the CTD driver actor system.
//!
//! This crate defines:
//! - **Actor trait**: Base trait for all actors with lifecycle methods
//! - **Channel management**: Type-safe message routing between actors
//! - **Logging**: `actor_*!` macros on top of `tracing`, plus subscriber setup
//!
//! ## Architecture
//!
//! The actor runtime follows these principles:
//! - **Zero shared state**: Each actor owns its data
//! - **Message passing**: Actors communicate via typed messages
//! - **Sequential processing**: Messages are handled one at a time, which is
//!   what serializes link events, inbound lines and operator commands for
//!   the device state machine
//! - **Failure isolation**: Actor errors don't crash the system
//!
//! ## Example
//!
//! ```ignore
//! use actor_runtime::{Actor, ChannelManager};
//!
//! let (manager, handles) = ChannelManager::new();
//! let driver = DriverActor::new(manager.port_sender(), handles.event_tx.clone());
//!
//! // Runs until every DriverMessage sender is dropped
//! driver.run(handles.driver_rx, handles.event_tx).await;
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod actor;
pub mod channels;
pub mod logging;

pub use actor::Actor;
pub use channels::{ActorHandles, ChannelManager, DriverMessage, LinkId, PortMessage};
pub use logging::init_tracing;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
