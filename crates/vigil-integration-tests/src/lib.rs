//! Integration test crate for the Vigil price adapters.
//!
//! This crate has no library code. It only contains integration tests that
//! drive feeds end to end over scripted sources.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p vigil-integration-tests
//! ```
