// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # closedloop-observability
//!
//! Logging setup shared by the closed-loop crates, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: one log folder per run next to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &["closedloop-control", "closedloop-config"];
