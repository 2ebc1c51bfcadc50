use std::collections::HashMap;

use log::debug;

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("package {0} not found")]
    NotFound(String),
    #[error("label lookup failed: {0}")]
    Lookup(String),
}

/// Resolves the user-facing name of an installed package.
pub trait AppLabels: Send + Sync {
    fn label(&self, package_name: &str) -> Result<String, LabelError>;
}

/// Best-effort display name; falls back to the package identifier.
pub fn display_name(labels: &dyn AppLabels, package_name: &str) -> String {
    match labels.label(package_name) {
        Ok(label) if !label.trim().is_empty() => label,
        Ok(_) => package_name.to_string(),
        Err(err) => {
            debug!("no label for {}: {}", package_name, err);
            package_name.to_string()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticLabels {
    labels: HashMap<String, String>,
}

impl StaticLabels {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }
}

impl FromIterator<(String, String)> for StaticLabels {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl AppLabels for StaticLabels {
    fn label(&self, package_name: &str) -> Result<String, LabelError> {
        self.labels
            .get(package_name)
            .cloned()
            .ok_or_else(|| LabelError::NotFound(package_name.to_string()))
    }
}
