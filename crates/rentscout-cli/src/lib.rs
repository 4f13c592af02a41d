// Copyright 2026 RentScout Contributors
// SPDX-License-Identifier: MIT

//! RentScout command line and REST surface.
//!
//! The binary in `main.rs` wires these modules together; they live in a
//! library so the router can be exercised in tests without a socket.

pub mod config;
pub mod output;
pub mod rest;
