use std::path::Path;

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::ObjectId;

/// Catalog behaviour switches.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Match token type names ignoring ASCII case. Parsers report aliases
    /// case-sensitively, so this is off by default.
    pub token_types_case_insensitive: bool,
    /// First id handed out to user-defined objects. Lower ids are built-ins.
    pub first_normal_object_id: ObjectId,
    /// Bootstrap mode: new objects get built-in ids and built-in dictionaries
    /// may be altered.
    pub bootstrap: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            token_types_case_insensitive: false,
            first_normal_object_id: 16384,
            bootstrap: false,
        }
    }
}

impl CatalogConfig {
    /// Load config from TOML and environment variables.
    ///
    /// Environment variables use `TSEARCH__` prefix with `__` separators.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        } else {
            builder = builder.add_source(config::File::with_name("tsearch").required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("TSEARCH").separator("__"));
        let config: CatalogConfig = builder
            .build()
            .map_err(|err| CatalogError::InvalidConfig(err.to_string()))?
            .try_deserialize()
            .map_err(|err| CatalogError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if self.first_normal_object_id < 2 {
            return Err(CatalogError::InvalidConfig(
                "first_normal_object_id must leave room for built-in ids".into(),
            ));
        }
        Ok(())
    }
}
