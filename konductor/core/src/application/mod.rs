// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod generation_pipeline;

// Re-export use cases for convenience
pub use generation_pipeline::{
    GenerationPipeline, GenerationReport, GenerationRequest, PipelineStage, ValidationReport,
};
