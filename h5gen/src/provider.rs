//! Input boundary: where record descriptors come from.

use crate::error::ProviderError;
use h5gen_types::DescriptorFile;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supplies the declarations of one input header, in declaration order.
pub trait TypeDescriptorProvider {
    fn describe(&self) -> Result<DescriptorFile, ProviderError>;
}

/// Reads a descriptor file written by an introspector. `.json` files are
/// parsed as JSON, anything else as YAML.
pub struct FileDescriptorProvider {
    path: PathBuf,
}

impl FileDescriptorProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl TypeDescriptorProvider for FileDescriptorProvider {
    fn describe(&self) -> Result<DescriptorFile, ProviderError> {
        if !self.path.exists() {
            return Err(ProviderError::NotFound(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|source| ProviderError::Read { path: self.path.clone(), source })?;

        let file: DescriptorFile = if self.is_json() {
            serde_json::from_str(&content)
                .map_err(|source| ProviderError::Json { path: self.path.clone(), source })?
        } else {
            serde_yml::from_str(&content)
                .map_err(|source| ProviderError::Yaml { path: self.path.clone(), source })?
        };

        if file.source.trim().is_empty() {
            return Err(ProviderError::MissingSource(self.path.clone()));
        }
        debug!(
            path = %self.path.display(),
            declarations = file.declarations.len(),
            "loaded descriptors"
        );
        Ok(file)
    }
}
