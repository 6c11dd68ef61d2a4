//! Helpers shared by integration tests.

#![allow(dead_code)]

pub mod socket_guard;

pub use socket_guard::start_mock_server_or_skip;
