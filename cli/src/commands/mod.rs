// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for Konductor CLI

pub mod config;
pub mod generate;
pub mod provider;

pub use self::config::ConfigCommand;
pub use self::generate::{GenerateArgs, ValidateArgs};
