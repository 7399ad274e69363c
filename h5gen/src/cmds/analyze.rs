/* Analyze command - print the classified schema of every record */

use super::common::{ConfigOverrides, build_driver, load_config, load_descriptors};
use crate::driver::GenerationOutput;
use crate::schema::registry::GeneratedTypesRegistry;
use anyhow::Context;
use clap::ValueEnum;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
  Json,
  Yaml,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct AnalysisReport<'a> {
  source: &'a str,
  namespace: Option<&'a str>,
  #[serde(flatten)]
  output: &'a GenerationOutput,
  registry: &'a GeneratedTypesRegistry,
}

/* Run the pipeline without writing anything and render the report */
pub fn analyze(file: PathBuf, config_path: Option<PathBuf>, format: ReportFormat) -> anyhow::Result<String> {
  let config = load_config(config_path.as_deref(), ConfigOverrides::default())?;
  let descriptors = load_descriptors(&file)?;

  let driver = build_driver(&config, &descriptors, "");
  let mut registry = GeneratedTypesRegistry::new();
  let output = driver.run(&descriptors, &mut registry);

  let report = AnalysisReport {
    source: &descriptors.source,
    namespace: driver.generator().options().namespace.as_deref(),
    output: &output,
    registry: &registry,
  };
  let rendered = match format {
    ReportFormat::Json => serde_json::to_string_pretty(&report).context("failed to render JSON report")?,
    ReportFormat::Yaml => serde_yml::to_string(&report).context("failed to render YAML report")?,
  };
  Ok(rendered)
}

/* Execute the analyze command */
pub fn run(file: PathBuf, config_path: Option<PathBuf>, format: ReportFormat) -> anyhow::Result<()> {
  let rendered = analyze(file, config_path, format)?;
  println!("{}", rendered);
  Ok(())
}
