// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod manifest_parser;
pub mod reference_resolver;
pub mod template_engine;
pub mod python;
pub mod providers;

pub use manifest_parser::ManifestParser;
pub use providers::ProviderRegistry;
pub use reference_resolver::ReferenceResolver;
