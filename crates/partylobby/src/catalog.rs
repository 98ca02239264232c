//! The rule catalog: a static JSON document loaded once at start-up.

use std::path::Path;
use std::sync::Arc;

use crate::CatalogError;

/// Read-only reference content served by `ListRules`.
///
/// The server never looks inside the document. Cloning is cheap: every
/// clone shares the same parsed value.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    document: Arc<serde_json::Value>,
}

impl RuleCatalog {
    /// Reads and parses the catalog file.
    ///
    /// # Errors
    /// [`CatalogError::Read`] if the file can't be read,
    /// [`CatalogError::Parse`] if it isn't valid JSON. Either one should
    /// stop the server from starting.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = raw.len(), "rule catalog loaded");
        Ok(Self::from_value(document))
    }

    /// Wraps an already parsed document.
    pub fn from_value(document: serde_json::Value) -> Self {
        Self {
            document: Arc::new(document),
        }
    }

    pub fn document(&self) -> &serde_json::Value {
        &self.document
    }
}
