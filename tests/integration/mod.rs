//! Integration test suite for yuzu-updater
//!
//! End-to-end tests of the update workflow against in-memory capabilities,
//! and of the binary's command-line contract. No test touches the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: Argument handling, exit codes, overrides file lookup
//! - **workflow**: Full update runs on both platform layouts

mod cli;
mod workflow;
