//! Integration test utilities for the gateway client
//!
//! This crate provides fixture payloads, recording listeners, an in-process
//! harness that feeds frames through the transport, bus and state store,
//! and a mock gateway server for end-to-end socket tests.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
