// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lib
//!
//! Manifest-driven code generation for agent frameworks.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Parse agent manifests, resolve their references and hand the
//!   linked graph to a pluggable provider that writes a runnable project

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
