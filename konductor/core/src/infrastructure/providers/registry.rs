// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Code Generator Registry
//
// Maps provider names to generator instances. Built once per process by
// explicit registration; lookups never mutate it.

use crate::domain::errors::{KonductorError, RegistryError};
use crate::domain::generator::CodeGenerator;
use std::sync::Arc;
use tracing::debug;

use super::google_adk::GoogleAdkGenerator;
use super::stub::StubGenerator;

/// Registry of code generators, in registration order
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<(String, Arc<dyn CodeGenerator>)>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider: `google_adk`, then `stub`
    pub fn with_builtin_providers() -> Result<Self, KonductorError> {
        let mut registry = Self::new();
        registry.register(GoogleAdkGenerator::NAME, Arc::new(GoogleAdkGenerator::new()?))?;
        registry.register(StubGenerator::NAME, Arc::new(StubGenerator::new()))?;
        Ok(registry)
    }

    /// Register a generator under `name`; a name can be registered once
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        debug!("Registered provider '{}'", name);
        self.providers.push((name, generator));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn CodeGenerator>, RegistryError> {
        self.providers
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, generator)| Arc::clone(generator))
            .ok_or_else(|| RegistryError::UnknownProvider {
                name: name.to_string(),
                available: self.list(),
            })
    }

    /// Registered provider names, in registration order
    pub fn list(&self) -> Vec<String> {
        self.providers.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.iter().any(|(registered, _)| registered == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration_order() {
        let registry = ProviderRegistry::with_builtin_providers().unwrap();
        assert_eq!(registry.list(), vec!["google_adk", "stub"]);
        assert_eq!(registry.get("stub").unwrap().name(), "stub");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ProviderRegistry::new();
        registry.register("stub", Arc::new(StubGenerator::new())).unwrap();
        let err = registry.register("stub", Arc::new(StubGenerator::new())).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered("stub".into()));
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        let registry = ProviderRegistry::with_builtin_providers().unwrap();
        match registry.get("crewai") {
            Err(RegistryError::UnknownProvider { name, available }) => {
                assert_eq!(name, "crewai");
                assert_eq!(available, vec!["google_adk", "stub"]);
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("crewai should not be registered"),
        }
    }
}
