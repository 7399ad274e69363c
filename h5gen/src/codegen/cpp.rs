use crate::codegen::artifacts::{ArtifactEntry, GeneratedArtifacts, RecordEmission};
use crate::codegen::cpp_gen::helpers::{close_namespace, open_namespace};
use crate::codegen::cpp_gen::{
  DeclarationStyle, emit_init_routine, emit_members, emit_serializer_bodies, emit_serializer_prototypes,
  emit_shadow_class, emit_trait, emit_type_declaration, trait_entries,
};
use crate::config::OutputMode;
use crate::schema::builder::CompoundSchema;
use crate::schema::registry::GeneratedTypesRegistry;
use crate::schema::shadow::ShadowLayout;
use h5gen_types::RecordDescriptor;
use std::fmt::Write;
use tracing::debug;

pub struct CppCodeGeneratorOptions {
  pub namespace: Option<String>,
  /// Header holding the records, included by the output
  pub input_header: String,
  pub traits_header: String,
  pub emit_serializers: bool,
  pub output_mode: OutputMode,
  /// File name of the generated header, included by the split-mode source
  pub header_name: String,
}

impl Default for CppCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      namespace: None,
      input_header: "types.h".to_string(),
      traits_header: "HDF5_TypeTraits.h".to_string(),
      emit_serializers: true,
      output_mode: OutputMode::HeaderOnly,
      header_name: "types_hdf5.h".to_string(),
    }
  }
}

/// Assembled file contents. `source` is only produced in split mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
  pub header: String,
  pub source: Option<String>,
}

pub struct CppCodeGenerator {
  options: CppCodeGeneratorOptions,
}

impl CppCodeGenerator {
  pub fn new(options: CppCodeGeneratorOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &CppCodeGeneratorOptions {
    &self.options
  }

  fn namespace(&self) -> Option<&str> {
    self.options.namespace.as_deref()
  }

  /// Emit declarations, registrations and serializer bodies for one record.
  /// Fields that cannot be registered become comments; this never fails.
  pub fn emit_record(
    &self,
    record: &RecordDescriptor,
    schema: &CompoundSchema,
    shadow: Option<&ShadowLayout>,
    registry: &GeneratedTypesRegistry,
  ) -> RecordEmission {
    debug_assert_eq!(shadow.is_some(), schema.needs_shadow);

    let (members, mut diagnostics) = emit_members(schema, registry);
    let with_serializers = self.options.emit_serializers && shadow.is_some();
    let inline_bodies = self.options.output_mode == OutputMode::HeaderOnly;

    let shadow_source = shadow.map(|layout| {
      diagnostics.extend(layout.diagnostics());
      emit_shadow_class(layout)
    });

    debug!(
      record = record.identity(),
      members = members.len(),
      registrations = members.iter().filter(|m| m.registration.is_some()).count(),
      shadowed = shadow_source.is_some(),
      "emitted record"
    );

    RecordEmission {
      record: schema.record.clone(),
      type_name: schema.type_name.clone(),
      symbol: schema.symbol.clone(),
      size_expr: schema.size.to_sizeof(),
      members,
      shadow_source,
      serializer_prototypes: with_serializers.then(|| emit_serializer_prototypes(schema)),
      serializer_bodies: with_serializers.then(|| emit_serializer_bodies(schema, inline_bodies)),
      traits: trait_entries(schema, with_serializers),
      diagnostics,
    }
  }

  /// Assemble the artifact groups into file contents.
  pub fn render(&self, artifacts: &GeneratedArtifacts) -> RenderedOutput {
    match self.options.output_mode {
      OutputMode::HeaderOnly => RenderedOutput { header: self.render_header_only(artifacts), source: None },
      OutputMode::Split => {
        let (header, source) = self.render_split(artifacts);
        RenderedOutput { header, source: Some(source) }
      }
    }
  }

  fn banner(&self, artifacts: &GeneratedArtifacts) -> String {
    format!(
      "// generated by h5gen from `{}`, do not edit manually\n",
      artifacts.source_header
    )
  }

  fn render_preamble(&self, artifacts: &GeneratedArtifacts) -> String {
    let mut out = String::from("#pragma once\n");
    out.push_str(&self.banner(artifacts));
    out.push('\n');
    out.push_str("#include <H5Cpp.h>\n");
    out.push_str("#include <cstdlib>\n");
    out.push_str("#include <cstring>\n");
    writeln!(out, "#include \"{}\"", self.options.input_header).unwrap();
    writeln!(out, "#include \"{}\"", self.options.traits_header).unwrap();
    out.push('\n');
    out.push_str("#define TO_H5T(type_name) (*HDF5::to_h5type<type_name>::get())\n\n");
    out
  }

  /* Type declarations group: compound type objects plus comments for skipped declarations */
  fn render_type_declarations(&self, artifacts: &GeneratedArtifacts, style: DeclarationStyle) -> String {
    let mut out = String::new();
    for entry in &artifacts.entries {
      match entry {
        ArtifactEntry::Record(record) => out.push_str(&emit_type_declaration(record, style)),
        ArtifactEntry::Skipped(diagnostic) => writeln!(out, "{}", diagnostic.to_comment()).unwrap(),
      }
    }
    out
  }

  /* Shadow-layout group */
  fn render_shadow_classes(&self, artifacts: &GeneratedArtifacts) -> String {
    let mut out = String::new();
    for source in artifacts.records().filter_map(|r| r.shadow_source.as_deref()) {
      out.push_str(source);
      out.push('\n');
    }
    out
  }

  fn render_prototypes(&self, artifacts: &GeneratedArtifacts) -> String {
    let mut out = String::new();
    for protos in artifacts.records().filter_map(|r| r.serializer_prototypes.as_deref()) {
      out.push_str(protos);
    }
    out
  }

  fn render_bodies(&self, artifacts: &GeneratedArtifacts) -> String {
    let mut out = String::new();
    for body in artifacts.records().filter_map(|r| r.serializer_bodies.as_deref()) {
      out.push('\n');
      out.push_str(body);
    }
    out
  }

  /* Trait table group, inside `namespace HDF5` */
  fn render_trait_table(&self, artifacts: &GeneratedArtifacts) -> String {
    let mut out = String::from("namespace HDF5\n{\n");
    for entry in artifacts.trait_table() {
      out.push_str(&emit_trait(entry, self.namespace()));
      out.push('\n');
    }
    out.push_str("} // namespace HDF5\n");
    out
  }

  fn render_header_only(&self, artifacts: &GeneratedArtifacts) -> String {
    let ns = self.namespace();
    let mut out = self.render_preamble(artifacts);

    out.push_str(&open_namespace(ns));
    out.push_str(&self.render_shadow_classes(artifacts));
    out.push_str(&self.render_type_declarations(artifacts, DeclarationStyle::InlineDefinition));
    let prototypes = self.render_prototypes(artifacts);
    if !prototypes.is_empty() {
      out.push('\n');
      out.push_str(&prototypes);
    }
    out.push_str(&close_namespace(ns));
    out.push('\n');

    /* Specializations precede init_h5types(), which may use them through TO_H5T */
    out.push_str(&self.render_trait_table(artifacts));
    out.push('\n');

    out.push_str(&open_namespace(ns));
    out.push_str(&emit_init_routine(artifacts.records(), true));
    out.push_str(&self.render_bodies(artifacts));
    out.push_str(&close_namespace(ns));
    out
  }

  fn render_split(&self, artifacts: &GeneratedArtifacts) -> (String, String) {
    let ns = self.namespace();

    let mut header = self.render_preamble(artifacts);
    header.push_str(&open_namespace(ns));
    header.push_str(&self.render_shadow_classes(artifacts));
    header.push_str(&self.render_type_declarations(artifacts, DeclarationStyle::ExternDeclaration));
    header.push('\n');
    header.push_str("void init_h5types();\n");
    header.push_str(&self.render_prototypes(artifacts));
    header.push_str(&close_namespace(ns));
    header.push('\n');
    header.push_str(&self.render_trait_table(artifacts));

    let mut source = self.banner(artifacts);
    source.push('\n');
    writeln!(source, "#include \"{}\"", self.options.header_name).unwrap();
    source.push('\n');
    source.push_str(&open_namespace(ns));
    source.push_str(&self.render_type_declarations(artifacts, DeclarationStyle::Definition));
    source.push('\n');
    source.push_str(&emit_init_routine(artifacts.records(), false));
    source.push_str(&self.render_bodies(artifacts));
    source.push_str(&close_namespace(ns));

    (header, source)
  }
}
