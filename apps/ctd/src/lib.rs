//! # CTD driver application
//!
//! Configuration, command line and operator plumbing around the
//! `ctd-actors` driver. The `ctd` binary drives a logger through a serial
//! bridge; `ctd-sim` plays the logger.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::todo
)]

pub mod cli;
pub mod config;
pub mod control;
pub mod tracker;

pub use cli::{Args, SimArgs};
pub use config::{ConfigError, DriverConfig};
pub use tracker::PhaseTracker;
