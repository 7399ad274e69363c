//! Runs the pipeline over every declaration of a descriptor file.

use crate::codegen::{CppCodeGenerator, GeneratedArtifacts};
use crate::config::is_namespace_path;
use crate::schema::builder::{CompoundSchema, RecordSchemaBuilder};
use crate::schema::classify::FieldClassifier;
use crate::schema::diagnostic::{Diagnostic, DiagnosticKind};
use crate::schema::registry::GeneratedTypesRegistry;
use crate::schema::shadow::{ShadowLayout, ShadowRecordSynthesizer};
use h5gen_types::{Declaration, DescriptorFile, RecordDescriptor};
use serde_derive::Serialize;
use tracing::{debug, info, warn};

/// Schema and shadow of one processed record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordReport {
    pub schema: CompoundSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowLayout>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GenerationOutput {
    #[serde(skip)]
    pub artifacts: GeneratedArtifacts,
    pub records: Vec<RecordReport>,
    /// Declarations that produced nothing, with the reason
    pub skipped: Vec<Diagnostic>,
    /// Enumerations seen during traversal
    pub enums: Vec<String>,
}

impl GenerationOutput {
    pub fn report(&self, type_name: &str) -> Option<&RecordReport> {
        self.records.iter().find(|r| r.schema.type_name == type_name)
    }

    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.artifacts.diagnostics()
    }
}

pub struct Driver {
    classifier: FieldClassifier,
    generator: CppCodeGenerator,
}

impl Driver {
    pub fn new(classifier: FieldClassifier, generator: CppCodeGenerator) -> Self {
        Self { classifier, generator }
    }

    pub fn generator(&self) -> &CppCodeGenerator {
        &self.generator
    }

    /// Visit every declaration once, parents before the records nested in
    /// them. Each record is classified, shadowed when needed, emitted, and
    /// registered before the next one is looked at.
    pub fn run(&self, file: &DescriptorFile, registry: &mut GeneratedTypesRegistry) -> GenerationOutput {
        let mut output = GenerationOutput {
            artifacts: GeneratedArtifacts::new(&file.source, self.generator.options().namespace.clone()),
            records: Vec::new(),
            skipped: Vec::new(),
            enums: Vec::new(),
        };
        self.visit(&file.declarations, registry, &mut output);

        for diagnostic in output.artifacts.diagnostics() {
            diagnostic.log();
        }
        info!(
            source = %file.source,
            records = output.records.len(),
            skipped = output.skipped.len(),
            enums = output.enums.len(),
            "generation finished"
        );
        output
    }

    fn visit(&self, declarations: &[Declaration], registry: &mut GeneratedTypesRegistry, output: &mut GenerationOutput) {
        for declaration in declarations {
            match declaration {
                Declaration::Enum(enumeration) => {
                    debug!(name = %enumeration.name, "enumeration visited, nothing emitted");
                    output.enums.push(enumeration.name.clone());
                }
                Declaration::Record(record) if record.is_template => {
                    let diagnostic = Diagnostic::record(record.identity(), DiagnosticKind::TemplateRecordSkipped);
                    output.artifacts.push_skipped(diagnostic.clone());
                    output.skipped.push(diagnostic);
                }
                Declaration::Record(record) => {
                    self.process_record(record, registry, output);
                    self.visit(&record.nested, registry, output);
                }
            }
        }
    }

    fn process_record(
        &self,
        record: &RecordDescriptor,
        registry: &mut GeneratedTypesRegistry,
        output: &mut GenerationOutput,
    ) {
        debug!(record = record.identity(), fields = record.fields.len(), "processing record");
        let schema = RecordSchemaBuilder::new(&self.classifier).build(record, registry);
        let shadow = schema.needs_shadow.then(|| ShadowRecordSynthesizer::synthesize(record, &schema));
        let emission = self.generator.emit_record(record, &schema, shadow.as_ref(), registry);

        output.records.push(RecordReport { schema, shadow, diagnostics: emission.diagnostics.clone() });
        output.artifacts.push_record(emission);
    }
}

/// Namespace declared by the descriptor file, or the enclosing scope of the
/// first record's qualified name. Neither is used unless it is a valid C++
/// namespace path.
pub fn infer_namespace(file: &DescriptorFile) -> Option<String> {
    if let Some(declared) = file.namespace.as_deref().map(str::trim).filter(|ns| !ns.is_empty()) {
        if is_namespace_path(declared) {
            return Some(declared.to_string());
        }
        warn!(namespace = declared, "declared namespace is not a namespace path, inferring from records");
    }
    file.records().into_iter().find_map(|record| {
        let suffix = format!("::{}", record.name);
        record
            .qualified_name
            .strip_suffix(&suffix)
            .map(|scope| scope.trim_start_matches("::").to_string())
            .filter(|scope| is_namespace_path(scope))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CppCodeGeneratorOptions;
    use crate::schema::kind::FieldKind;
    use h5gen_types::{BuiltinKind, EnumDescriptor, FieldDescriptor, TypeDescriptor};

    fn driver() -> Driver {
        let options = CppCodeGeneratorOptions { namespace: Some("ns".into()), ..Default::default() };
        Driver::new(FieldClassifier::default(), CppCodeGenerator::new(options))
    }

    fn scalar_record(name: &str) -> RecordDescriptor {
        RecordDescriptor::new(
            name,
            format!("ns::{name}"),
            vec![FieldDescriptor::new("x", TypeDescriptor::builtin("double", BuiltinKind::Double))],
        )
    }

    fn user(name: &str, nested: &str) -> RecordDescriptor {
        RecordDescriptor::new(
            name,
            format!("ns::{name}"),
            vec![FieldDescriptor::new("inner", TypeDescriptor::record(nested, format!("ns::{nested}")))],
        )
    }

    fn file(declarations: Vec<Declaration>) -> DescriptorFile {
        DescriptorFile { source: "t.h".into(), namespace: Some("ns".into()), declarations }
    }

    #[test]
    fn test_nested_record_declared_first_resolves() {
        let input = file(vec![Declaration::Record(scalar_record("B")), Declaration::Record(user("A", "B"))]);
        let mut registry = GeneratedTypesRegistry::new();
        let output = driver().run(&input, &mut registry);
        let a = output.report("A").expect("A processed");
        assert_eq!(
            a.schema.entry("inner").map(|e| &e.kind),
            Some(&FieldKind::NestedRecord { record: "ns::B".into(), symbol: "B_h5type".into() })
        );
        assert!(a.diagnostics.is_empty());
    }

    #[test]
    fn test_forward_use_is_deferred() {
        let input = file(vec![Declaration::Record(user("A", "B")), Declaration::Record(scalar_record("B"))]);
        let output = driver().run(&input, &mut GeneratedTypesRegistry::new());
        let a = output.report("A").expect("A processed");
        assert_eq!(
            a.schema.entry("inner").map(|e| &e.kind),
            Some(&FieldKind::DeferredUnresolved { record: "ns::B".into() })
        );
        let emission = output.artifacts.record("A").expect("A emitted");
        assert_eq!(emission.registrations().count(), 0);
        assert!(emission.members[0].comments[0].contains("has no compound type yet"));
    }

    #[test]
    fn test_registry_order_and_nested_preorder() {
        let mut outer = scalar_record("Outer");
        outer.nested.push(Declaration::Record(scalar_record("Outer::Inner")));
        let input = file(vec![
            Declaration::Record(outer),
            Declaration::Enum(EnumDescriptor {
                name: "Color".into(),
                qualified_name: "ns::Color".into(),
                scoped: true,
                variants: vec![],
            }),
            Declaration::Record(scalar_record("Tail")),
        ]);
        let mut registry = GeneratedTypesRegistry::new();
        let output = driver().run(&input, &mut registry);
        let order: Vec<&str> = registry.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["ns::Outer", "ns::Outer::Inner", "ns::Tail"]);
        assert_eq!(output.enums, vec!["Color"]);
        assert_eq!(output.artifacts.records().count(), 3);
    }

    #[test]
    fn test_template_record_skipped() {
        let mut template = scalar_record("Box");
        template.is_template = true;
        template.nested.push(Declaration::Record(scalar_record("Box::Item")));
        let input = file(vec![Declaration::Record(template), Declaration::Record(scalar_record("Plain"))]);
        let mut registry = GeneratedTypesRegistry::new();
        let output = driver().run(&input, &mut registry);
        assert_eq!(output.skipped.len(), 1);
        assert_eq!(output.skipped[0].kind, DiagnosticKind::TemplateRecordSkipped);
        assert!(!registry.contains("ns::Box"));
        assert!(!registry.contains("ns::Box::Item"));
        assert_eq!(output.records.len(), 1);
    }

    #[test]
    fn test_run_is_deterministic() {
        let input = file(vec![
            Declaration::Record(scalar_record("B")),
            Declaration::Record(user("A", "B")),
            Declaration::Record(user("C", "Missing")),
        ]);
        let d = driver();
        let first = d.generator().render(&d.run(&input, &mut GeneratedTypesRegistry::new()).artifacts);
        let second = d.generator().render(&d.run(&input, &mut GeneratedTypesRegistry::new()).artifacts);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shadow_elsewhere_keeps_offsets() {
        let plain = scalar_record("Plain");
        let shadowed = RecordDescriptor::new(
            "Texty",
            "ns::Texty",
            vec![FieldDescriptor::new("s", TypeDescriptor::record("std::string", "std::string"))],
        );
        let alone = driver().run(&file(vec![Declaration::Record(plain.clone())]), &mut GeneratedTypesRegistry::new());
        let together = driver().run(
            &file(vec![Declaration::Record(shadowed), Declaration::Record(plain)]),
            &mut GeneratedTypesRegistry::new(),
        );
        let before = alone.artifacts.record("Plain").expect("plain emitted");
        let after = together.artifacts.record("Plain").expect("plain emitted");
        assert_eq!(before.members, after.members);
        assert_eq!(before.size_expr, "sizeof(Plain)");
        assert_eq!(after.size_expr, "sizeof(Plain)");
    }

    #[test]
    fn test_infer_namespace() {
        let mut input = file(vec![Declaration::Record(scalar_record("A"))]);
        assert_eq!(infer_namespace(&input).as_deref(), Some("ns"));
        input.namespace = None;
        assert_eq!(infer_namespace(&input).as_deref(), Some("ns"));
        input.declarations = vec![Declaration::Record(RecordDescriptor::new("A", "A", vec![]))];
        assert_eq!(infer_namespace(&input), None);
    }

    #[test]
    fn test_infer_namespace_rejects_invalid_paths() {
        let mut input = file(vec![Declaration::Record(scalar_record("A"))]);
        input.namespace = Some("not a namespace".into());
        assert_eq!(infer_namespace(&input).as_deref(), Some("ns"));
        input.namespace = Some(" outer::inner ".into());
        assert_eq!(infer_namespace(&input).as_deref(), Some("outer::inner"));

        input.namespace = Some("1bad".into());
        input.declarations = vec![
            Declaration::Record(RecordDescriptor::new("Hidden", "(anonymous namespace)::Hidden", vec![])),
            Declaration::Record(scalar_record("B")),
        ];
        assert_eq!(infer_namespace(&input).as_deref(), Some("ns"));
        input.declarations.pop();
        assert_eq!(infer_namespace(&input), None);
    }
}
