/* Generate command - write HDF5 compound type code for the described records */

use super::common::{ConfigOverrides, build_driver, default_output_path, load_config, load_descriptors};
use crate::config::OutputMode;
use crate::error::GenerateError;
use crate::schema::registry::GeneratedTypesRegistry;
use std::path::{Path, PathBuf};
use tracing::info;

fn write_artifact(path: &Path, content: &str) -> Result<(), GenerateError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(|source| GenerateError::Write { path: parent.to_path_buf(), source })?;
  }
  std::fs::write(path, content).map_err(|source| GenerateError::Write { path: path.to_path_buf(), source })?;
  info!(path = %path.display(), bytes = content.len(), "wrote artifact");
  Ok(())
}

/* Execute the generate command, returning the written paths */
pub fn run(
  file: PathBuf,
  output: Option<PathBuf>,
  namespace: Option<String>,
  config_path: Option<PathBuf>,
  mode: Option<OutputMode>,
) -> Result<Vec<PathBuf>, GenerateError> {
  let config = load_config(
    config_path.as_deref(),
    ConfigOverrides { namespace, output_mode: mode },
  )?;
  let descriptors = load_descriptors(&file)?;

  let out_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
  let header_path = output.unwrap_or_else(|| default_output_path(&descriptors.source, &out_dir));
  let header_name = header_path
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or("types_hdf5.h")
    .to_string();

  let driver = build_driver(&config, &descriptors, &header_name);
  let mut registry = GeneratedTypesRegistry::new();
  let output = driver.run(&descriptors, &mut registry);
  let rendered = driver.generator().render(&output.artifacts);

  let mut written = vec![header_path.clone()];
  write_artifact(&header_path, &rendered.header)?;
  if let Some(source) = &rendered.source {
    let source_path = header_path.with_extension("cpp");
    write_artifact(&source_path, source)?;
    written.push(source_path);
  }

  info!(
    records = output.records.len(),
    registered = registry.len(),
    diagnostics = output.diagnostics().len(),
    "code generation complete"
  );
  Ok(written)
}
