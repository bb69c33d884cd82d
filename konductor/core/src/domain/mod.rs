// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Resource model, manifests, the generator contract and the error taxonomy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by every stage; no I/O beyond configuration loading

pub mod errors;
pub mod resource;
pub mod manifest;
pub mod generator;
pub mod generator_config;
