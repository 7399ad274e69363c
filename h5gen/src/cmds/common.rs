/* Common utilities shared between analyze and generate commands */

use crate::codegen::{CppCodeGenerator, CppCodeGeneratorOptions};
use crate::config::{GeneratorConfig, OutputMode};
use crate::driver::{Driver, infer_namespace};
use crate::error::{ConfigError, ProviderError};
use crate::provider::{FileDescriptorProvider, TypeDescriptorProvider};
use crate::schema::classify::FieldClassifier;
use h5gen_types::DescriptorFile;
use std::path::{Path, PathBuf};
use tracing::info;

/* Values given on the command line, applied over the config file */
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
  pub namespace: Option<String>,
  pub output_mode: Option<OutputMode>,
}

/* Load the config file (or defaults) and apply command line overrides */
pub fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<GeneratorConfig, ConfigError> {
  let mut config = GeneratorConfig::load_or_default(path)?;
  if let Some(namespace) = overrides.namespace {
    config.namespace = Some(namespace);
  }
  if let Some(mode) = overrides.output_mode {
    config.output_mode = mode;
  }
  config.validate()?;
  Ok(config)
}

/* Read descriptors; a missing or malformed file stops the run here */
pub fn load_descriptors(path: &Path) -> Result<DescriptorFile, ProviderError> {
  let file = FileDescriptorProvider::new(path).describe()?;
  info!(
    path = %path.display(),
    source = %file.source,
    records = file.records().len(),
    "descriptors loaded"
  );
  Ok(file)
}

/* `dir/CodeGen_types.h` -> `<out_dir>/CodeGen_types_hdf5.h` */
pub fn default_output_path(source_header: &str, out_dir: &Path) -> PathBuf {
  let file_name = Path::new(source_header)
    .file_name()
    .and_then(|name| name.to_str())
    .unwrap_or(source_header);
  let stem = file_name
    .strip_suffix(".hpp")
    .or_else(|| file_name.strip_suffix(".hxx"))
    .or_else(|| file_name.strip_suffix(".h"))
    .unwrap_or(file_name);
  out_dir.join(format!("{}_hdf5.h", stem))
}

/* Build a driver for `file` from the effective configuration */
pub fn build_driver(config: &GeneratorConfig, file: &DescriptorFile, header_name: &str) -> Driver {
  let namespace = config.namespace.clone().or_else(|| infer_namespace(file));
  let options = CppCodeGeneratorOptions {
    namespace,
    input_header: config.input_header.clone().unwrap_or_else(|| file.source.clone()),
    traits_header: config.traits_header.clone(),
    emit_serializers: config.emit_serializers,
    output_mode: config.output_mode,
    header_name: header_name.to_string(),
  };
  Driver::new(FieldClassifier::new(config.classifier.clone()), CppCodeGenerator::new(options))
}
