//! Configuration types for skeleton generation.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file by the CLI. Missing fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! # use oven::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.resolve().host_roots(), ["Tizen", "Window"]);
//! assert_eq!(config.resolve().function_only_marker(), "FunctionOnly");
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Resolver configuration section.
    #[serde(default)]
    resolve: ResolveConfig,
}

impl AppConfig {
    pub fn new(resolve: ResolveConfig) -> Self {
        Self { resolve }
    }

    /// Returns the resolver configuration.
    pub fn resolve(&self) -> &ResolveConfig {
        &self.resolve
    }
}

/// Settings that steer the semantic resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Names of the host objects an `implements` statement may attach to.
    host_roots: Vec<String>,

    /// Identity of the `[Callback=...]` attribute that marks plain functions.
    function_only_marker: String,
}

impl ResolveConfig {
    pub fn new(host_roots: Vec<String>, function_only_marker: impl Into<String>) -> Self {
        Self {
            host_roots,
            function_only_marker: function_only_marker.into(),
        }
    }

    pub fn host_roots(&self) -> &[String] {
        &self.host_roots
    }

    /// Returns `true` if `name` is one of the configured host roots.
    pub fn is_host_root(&self, name: &str) -> bool {
        self.host_roots.iter().any(|root| root == name)
    }

    pub fn function_only_marker(&self) -> &str {
        &self.function_only_marker
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            host_roots: vec!["Tizen".to_string(), "Window".to_string()],
            function_only_marker: "FunctionOnly".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_host_roots() {
        let config = ResolveConfig::default();
        assert!(config.is_host_root("Tizen"));
        assert!(config.is_host_root("Window"));
        assert!(!config.is_host_root("tizen"));
    }

    #[test]
    fn test_deserialize_partial_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [resolve]
            host_roots = ["Navigator"]
            "#,
        )
        .unwrap();

        assert_eq!(config.resolve().host_roots(), ["Navigator"]);
        assert_eq!(config.resolve().function_only_marker(), "FunctionOnly");
    }

    #[test]
    fn test_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.resolve().host_roots().len(), 2);
    }
}
