//! # CTD Actors
//!
//! Actors that run a CTD logger through its logging cycle.
//!
//! ## Components
//!
//! - **DeviceStateMachine**: One device session; applies the logging cycle
//!   transition table and pushes its effects into a `SessionSink`
//! - **DriverActor**: Owns the session, turns link status, inbound sentences
//!   and operator commands into state machine events
//! - **PortActor**: Owns the TCP link, frames inbound lines, writes commands,
//!   reconnects with backoff
//! - **simulator**: Device side of the protocol, used by `ctd-sim` and tests

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod backoff;
pub mod constants;
pub mod driver_actor;
pub mod port_actor;
pub mod simulator;
pub mod state_machine;

pub use driver_actor::{acknowledgement, DriverActor};
pub use port_actor::{LinkConfig, PortActor};
pub use state_machine::{DeviceStateMachine, SessionSink};
