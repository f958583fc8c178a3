use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use veex_core::CatalogSnapshot;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub http_addr: String,
    /// JSON catalog document loaded at startup.
    pub catalog_path: Option<PathBuf>,
    /// Volume applied when the catalog document configures none.
    pub default_volume: Option<i64>,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(default_http_addr: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let catalog_path = lookup("VEEX_CATALOG_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let default_volume = lookup("VEEX_DEFAULT_VOLUME")
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("VEEX_DEFAULT_VOLUME must be an integer, got `{raw}`"))
            })
            .transpose()?;

        if let Some(volume) = default_volume {
            anyhow::ensure!(volume > 0, "VEEX_DEFAULT_VOLUME must be positive, got {volume}");
        }

        Ok(Self {
            http_addr,
            catalog_path,
            default_volume,
        })
    }

    /// Reads the seed document, or starts from an empty catalog. The
    /// default volume only fills in a volume the document leaves unset.
    pub fn load_catalog(&self) -> Result<CatalogSnapshot> {
        let Some(path) = &self.catalog_path else {
            let mut snapshot = CatalogSnapshot::default();
            if let Some(volume) = self.default_volume {
                snapshot.config.set_expected_volume(volume);
            }
            return Ok(snapshot);
        };

        let document = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let mut snapshot = CatalogSnapshot::from_json(&document)?;

        if let Some(volume) = self.default_volume {
            let configured = snapshot.config.expected_monthly_volume;
            if configured.is_none_or(|configured| configured <= 0) {
                snapshot.config.set_expected_volume(volume);
            }
        }

        info!(
            path = %path.display(),
            materials = snapshot.materials.len(),
            models = snapshot.models.len(),
            volume = snapshot.expected_volume(),
            "catalog loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServiceConfig::from_lookup("0.0.0.0:8080", lookup(&[])).unwrap();
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert!(config.catalog_path.is_none());
        assert!(config.default_volume.is_none());
        assert_eq!(config.load_catalog().unwrap(), CatalogSnapshot::default());
    }

    #[test]
    fn rejects_bad_default_volume() {
        assert!(ServiceConfig::from_lookup("x", lookup(&[("VEEX_DEFAULT_VOLUME", "lots")])).is_err());
        assert!(ServiceConfig::from_lookup("x", lookup(&[("VEEX_DEFAULT_VOLUME", "0")])).is_err());
    }

    #[test]
    fn default_volume_fills_an_unconfigured_catalog() {
        let config = ServiceConfig::from_lookup(
            "x",
            lookup(&[("HTTP_ADDR", "127.0.0.1:9000"), ("VEEX_DEFAULT_VOLUME", "250")]),
        )
        .unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:9000");
        assert_eq!(config.load_catalog().unwrap().expected_volume(), 250);
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let config = ServiceConfig::from_lookup(
            "x",
            lookup(&[("VEEX_CATALOG_PATH", "/nonexistent/veex-catalog.json")]),
        )
        .unwrap();
        let err = config.load_catalog().unwrap_err();
        assert!(err.to_string().contains("reading catalog"));
    }
}
