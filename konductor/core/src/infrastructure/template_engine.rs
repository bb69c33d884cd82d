// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Template Engine
//!
//! This module renders provider output files from Handlebars templates.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Named templates + serializable context → file contents
//! - **Integration:** Providers register their templates once at construction
//!
//! Rendering is strict (a missing context field is an error) and performs no
//! HTML escaping; contexts carry values that are already valid target-language
//! source, so the output depends only on the template and the context.

use crate::domain::errors::GenerationError;
use handlebars::Handlebars;
use serde::Serialize;

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create an engine with no registered templates
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Create an engine and register every `(name, source)` pair
    pub fn with_templates(templates: &[(&str, &str)]) -> Result<Self, GenerationError> {
        let mut engine = Self::new();
        for (name, source) in templates {
            engine.register(name, source)?;
        }
        Ok(engine)
    }

    /// Compile and register a named template
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), GenerationError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| GenerationError::Template {
                template: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Render a registered template
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, GenerationError> {
        self.handlebars
            .render(name, context)
            .map_err(|e| GenerationError::Template {
                template: name.to_string(),
                message: e.to_string(),
            })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
