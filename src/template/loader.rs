//! Template loader.
//!
//! Builds a [`TemplateEngine`] from the `.html` files of a directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Result, TemplateEngine, TemplateError};

/// Extension of template files picked up by the loader.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Loads page templates from a directory.
#[derive(Debug)]
pub struct TemplateLoader {
    base_path: PathBuf,
}

impl TemplateLoader {
    /// Create a loader rooted at `base_path`.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Read a single template file by name (`"error"` reads `error.html`).
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self
            .base_path
            .join(format!("{name}.{TEMPLATE_EXTENSION}"));

        if !path.exists() {
            return Err(TemplateError::NotFound(format!(
                "Template '{name}' not found at {path:?}"
            )));
        }

        fs::read_to_string(&path)
            .map_err(|e| TemplateError::Load(format!("Failed to read template '{name}': {e}")))
    }

    /// Parse every template file in the directory into a new engine.
    ///
    /// Templates are registered under their file stem.
    pub fn load_all(&self) -> Result<TemplateEngine> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            TemplateError::Load(format!("Failed to read directory {:?}: {e}", self.base_path))
        })?;

        let mut engine = TemplateEngine::new();

        for entry in entries {
            let path = entry
                .map_err(|e| TemplateError::Load(format!("Failed to read entry: {e}")))?
                .path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != TEMPLATE_EXTENSION) {
                continue;
            }

            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let content = self.read(&name)?;
            engine.load(name.as_str(), &content).map_err(|e| {
                TemplateError::Parse(format!("{name}.{TEMPLATE_EXTENSION}: {e}"))
            })?;
            tracing::debug!(template = %name, "Loaded template");
        }

        Ok(engine)
    }

    /// Ensure the named templates were loaded.
    pub fn require(engine: &TemplateEngine, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !engine.has_template(name)) {
            Some(missing) => Err(TemplateError::NotFound((*missing).to_string())),
            None => Ok(()),
        }
    }
}
