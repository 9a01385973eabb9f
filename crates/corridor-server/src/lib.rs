//! Shared library surface for the corridor server and its tests.

pub mod api;
pub mod config;
pub mod output;
pub mod state;
