// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Code Generation Providers
//
// One module per target agent framework, each implementing the
// CodeGenerator domain interface. Providers are registered explicitly in
// ProviderRegistry::with_builtin_providers, google_adk first.

pub mod google_adk;
pub mod registry;
pub mod stub;

pub use google_adk::GoogleAdkGenerator;
pub use registry::ProviderRegistry;
pub use stub::StubGenerator;

use crate::domain::errors::GenerationError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Create `output_dir` and write `files` into it, in order
pub(crate) fn write_files(
    output_dir: &Path,
    files: Vec<(&str, String)>,
) -> Result<Vec<PathBuf>, GenerationError> {
    fs::create_dir_all(output_dir).map_err(|source| GenerationError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = output_dir.join(name);
        fs::write(&path, contents).map_err(|source| GenerationError::Write {
            path: path.clone(),
            source,
        })?;
        info!("Generated {}", path.display());
        written.push(path);
    }
    Ok(written)
}
