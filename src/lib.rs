//! toon-reel library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod animate;
pub mod cli;
pub mod config;
pub mod credential;
pub mod session;
