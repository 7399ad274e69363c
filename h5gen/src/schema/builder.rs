use crate::schema::classify::{FieldClassifier, MatrixShape, detect_matrix};
use crate::schema::diagnostic::{Diagnostic, DiagnosticKind};
use crate::schema::kind::FieldKind;
use crate::schema::registry::{GeneratedTypesRegistry, RegisteredType};
use h5gen_types::RecordDescriptor;
use serde_derive::Serialize;
use tracing::debug;

/// Which in-memory layout a member offset is taken against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutSide {
    Original,
    Shadow,
}

/// `HOFFSET(layout_type, member)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OffsetSource {
    pub layout: LayoutSide,
    pub layout_type: String,
    pub member: String,
}

impl OffsetSource {
    pub fn to_hoffset(&self) -> String {
        format!("HOFFSET({}, {})", self.layout_type, self.member)
    }
}

/// `sizeof(type_name)`, the size given to the compound type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SizeExpr {
    pub layout: LayoutSide,
    pub type_name: String,
}

impl SizeExpr {
    pub fn to_sizeof(&self) -> String {
        format!("sizeof({})", self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaEntry {
    pub field: String,
    pub kind: FieldKind,
    pub offset: OffsetSource,
    pub matched_by: &'static str,
    /// Diagnostics that do not exclude the field
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExcludedField {
    pub field: String,
    /// Absent for fields that were never classified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<MatrixShape>,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FieldOutcome {
    Entry(SchemaEntry),
    Excluded(ExcludedField),
}

impl FieldOutcome {
    pub fn field(&self) -> &str {
        match self {
            FieldOutcome::Entry(entry) => &entry.field,
            FieldOutcome::Excluded(excluded) => &excluded.field,
        }
    }
}

/// Fixed-layout description of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompoundSchema {
    /// Qualified name, the registry key
    pub record: String,
    /// Name as spelled inside the output namespace
    pub type_name: String,
    pub symbol: String,
    pub shadow_name: String,
    pub needs_shadow: bool,
    pub size: SizeExpr,
    /// Every field in declaration order
    pub fields: Vec<FieldOutcome>,
}

impl CompoundSchema {
    pub fn entries(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.fields.iter().filter_map(|outcome| match outcome {
            FieldOutcome::Entry(entry) => Some(entry),
            FieldOutcome::Excluded(_) => None,
        })
    }

    pub fn entry(&self, field: &str) -> Option<&SchemaEntry> {
        self.entries().find(|entry| entry.field == field)
    }

    pub fn variable_entries(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries().filter(|entry| entry.kind.is_variable_length())
    }

    pub fn excluded(&self) -> impl Iterator<Item = &ExcludedField> {
        self.fields.iter().filter_map(|outcome| match outcome {
            FieldOutcome::Excluded(excluded) => Some(excluded),
            FieldOutcome::Entry(_) => None,
        })
    }

    /// All diagnostics in field order.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.fields
            .iter()
            .flat_map(|outcome| match outcome {
                FieldOutcome::Entry(entry) => entry.diagnostics.iter().collect::<Vec<_>>(),
                FieldOutcome::Excluded(excluded) => vec![&excluded.diagnostic],
            })
            .collect()
    }
}

/// Replace characters that cannot appear in a C++ identifier.
pub fn sanitize_identifier(name: &str) -> String {
    let joined = name.trim().trim_start_matches("::").replace("::", "_");
    joined
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

pub fn schema_symbol(type_name: &str) -> String {
    format!("{}_h5type", sanitize_identifier(type_name))
}

pub fn shadow_name(type_name: &str) -> String {
    format!("{}_hvl", sanitize_identifier(type_name))
}

pub fn handle_name(field: &str) -> String {
    format!("{}_hvl", field)
}

fn excluded_diagnostic(kind: &FieldKind, matrix: Option<MatrixShape>) -> DiagnosticKind {
    match kind {
        FieldKind::SkippedSmartPointer { wrapper } => DiagnosticKind::SmartPointerSkipped { wrapper: wrapper.clone() },
        FieldKind::SkippedAnonymous => DiagnosticKind::AnonymousSkipped,
        FieldKind::SkippedEnum { enum_name } => DiagnosticKind::EnumSkipped { enum_name: enum_name.clone() },
        FieldKind::Unsupported { type_name } => match matrix {
            Some(shape) => DiagnosticKind::MatrixNotWired { type_name: type_name.clone(), shape },
            None => DiagnosticKind::UnsupportedType { type_name: type_name.clone() },
        },
        FieldKind::NestedRecord { record, .. } => DiagnosticKind::ShadowedNestedRecord { record: record.clone() },
        other => DiagnosticKind::UnsupportedType { type_name: other.to_string() },
    }
}

/// Builds [`CompoundSchema`] values and registers each finished record.
pub struct RecordSchemaBuilder<'c> {
    classifier: &'c FieldClassifier,
}

impl<'c> RecordSchemaBuilder<'c> {
    pub fn new(classifier: &'c FieldClassifier) -> Self {
        Self { classifier }
    }

    /// Classify the public fields of `record` in declaration order, decide
    /// whether a shadow layout is needed, then register the record.
    ///
    /// Nested records are not visited. Registration happens once, after the
    /// scan, so a record never sees itself as already generated.
    pub fn build(&self, record: &RecordDescriptor, registry: &mut GeneratedTypesRegistry) -> CompoundSchema {
        let owner = record.identity();
        let mut classified = Vec::with_capacity(record.fields.len());
        let mut excluded = Vec::new();

        for (index, field) in record.fields.iter().enumerate() {
            if !field.is_public() {
                excluded.push((
                    index,
                    ExcludedField {
                        field: field.name.clone(),
                        kind: None,
                        matrix: None,
                        diagnostic: Diagnostic::field(owner, &field.name, DiagnosticKind::NonPublicSkipped),
                    },
                ));
                continue;
            }

            let traced = self.classifier.classify_traced(field, registry);
            debug!(record = owner, field = %field.name, kind = %traced.kind, matcher = traced.matched_by, "classified field");

            // A shadowed record's compound type is sized for its shadow, not for this member
            let shadowed_nested = matches!(
                &traced.kind,
                FieldKind::NestedRecord { record, .. } if registry.lookup(record).is_some_and(|entry| entry.shadowed)
            );
            if traced.kind.is_schema_member() && !shadowed_nested {
                classified.push((index, field.name.clone(), traced.kind, traced.matched_by));
            } else {
                let matrix = match traced.kind {
                    FieldKind::Unsupported { .. } => detect_matrix(self.classifier, field),
                    _ => None,
                };
                let diagnostic = Diagnostic::field(owner, &field.name, excluded_diagnostic(&traced.kind, matrix));
                excluded.push((
                    index,
                    ExcludedField { field: field.name.clone(), kind: Some(traced.kind), matrix, diagnostic },
                ));
            }
        }

        let needs_shadow = classified.iter().any(|(_, _, kind, _)| kind.is_variable_length());
        let shadow = shadow_name(&record.name);
        let (layout, layout_type) = if needs_shadow {
            (LayoutSide::Shadow, shadow.clone())
        } else {
            (LayoutSide::Original, record.name.clone())
        };

        let mut fields: Vec<(usize, FieldOutcome)> = classified
            .into_iter()
            .map(|(index, field, kind, matched_by)| {
                let member = if kind.is_variable_length() { handle_name(&field) } else { field.clone() };
                let diagnostics = match &kind {
                    FieldKind::CStyleString => vec![Diagnostic::field(owner, &field, DiagnosticKind::UnsafeCString)],
                    FieldKind::DeferredUnresolved { record } => vec![Diagnostic::field(
                        owner,
                        &field,
                        DiagnosticKind::UnresolvedNestedType { record: record.clone() },
                    )],
                    _ => Vec::new(),
                };
                let offset = OffsetSource { layout, layout_type: layout_type.clone(), member };
                (index, FieldOutcome::Entry(SchemaEntry { field, kind, offset, matched_by, diagnostics }))
            })
            .collect();
        fields.extend(excluded.into_iter().map(|(index, excluded)| (index, FieldOutcome::Excluded(excluded))));
        fields.sort_by_key(|(index, _)| *index);

        let schema = CompoundSchema {
            record: owner.to_string(),
            type_name: record.name.clone(),
            symbol: schema_symbol(&record.name),
            shadow_name: shadow,
            needs_shadow,
            size: SizeExpr { layout, type_name: layout_type },
            fields: fields.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        registry.register(owner, RegisteredType { symbol: schema.symbol.clone(), shadowed: needs_shadow });
        debug!(
            record = owner,
            symbol = %schema.symbol,
            needs_shadow,
            entries = schema.entries().count(),
            "built compound schema"
        );
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5gen_types::{AccessSpecifier, BuiltinKind, FieldDescriptor, TypeDescriptor};

    fn int() -> TypeDescriptor {
        TypeDescriptor::builtin("int", BuiltinKind::Int)
    }

    fn build(record: &RecordDescriptor, registry: &mut GeneratedTypesRegistry) -> CompoundSchema {
        let classifier = FieldClassifier::default();
        RecordSchemaBuilder::new(&classifier).build(record, registry)
    }

    #[test]
    fn test_fixed_array_and_scalar() {
        let record = RecordDescriptor::new(
            "Plain",
            "ns::Plain",
            vec![
                FieldDescriptor::new("values", TypeDescriptor::constant_array(int(), 4)),
                FieldDescriptor::new("count", int()),
            ],
        );
        let mut registry = GeneratedTypesRegistry::new();
        let schema = build(&record, &mut registry);

        assert!(!schema.needs_shadow);
        assert_eq!(schema.entries().count(), 2);
        assert_eq!(schema.size.to_sizeof(), "sizeof(Plain)");
        for entry in schema.entries() {
            assert_eq!(entry.offset.layout, LayoutSide::Original);
            assert_eq!(entry.offset.to_hoffset(), format!("HOFFSET(Plain, {})", entry.field));
        }
        assert!(schema.diagnostics().is_empty());
        assert_eq!(registry.lookup("ns::Plain").map(|e| e.symbol.as_str()), Some("Plain_h5type"));
    }

    #[test]
    fn test_string_and_scalar_need_shadow() {
        let record = RecordDescriptor::new(
            "Named",
            "Named",
            vec![
                FieldDescriptor::new("name", TypeDescriptor::record("std::string", "std::string")),
                FieldDescriptor::new("id", int()),
            ],
        );
        let mut registry = GeneratedTypesRegistry::new();
        let schema = build(&record, &mut registry);

        assert!(schema.needs_shadow);
        assert_eq!(schema.size.to_sizeof(), "sizeof(Named_hvl)");
        let name = schema.entry("name").expect("name entry");
        assert_eq!(name.offset.to_hoffset(), "HOFFSET(Named_hvl, name_hvl)");
        let id = schema.entry("id").expect("id entry");
        assert_eq!(id.offset.to_hoffset(), "HOFFSET(Named_hvl, id)");
        assert_eq!(schema.variable_entries().count(), 1);
        assert!(registry.lookup("Named").is_some_and(|e| e.shadowed));
    }

    #[test]
    fn test_smart_pointer_excluded() {
        let record = RecordDescriptor::new(
            "Holder",
            "Holder",
            vec![
                FieldDescriptor::new(
                    "ptr",
                    TypeDescriptor::template("std::unique_ptr<Plain>", "std::unique_ptr", &["Plain"]),
                ),
                FieldDescriptor::new("x", int()),
            ],
        );
        let mut registry = GeneratedTypesRegistry::new();
        let schema = build(&record, &mut registry);

        assert!(!schema.needs_shadow);
        assert_eq!(schema.entries().map(|e| e.field.as_str()).collect::<Vec<_>>(), vec!["x"]);
        let diagnostics = schema.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].kind, DiagnosticKind::SmartPointerSkipped { .. }));
        assert_eq!(schema.fields[0].field(), "ptr");
    }

    #[test]
    fn test_non_public_fields_are_not_classified() {
        let mut hidden = FieldDescriptor::new("secret", int());
        hidden.access = AccessSpecifier::Private;
        let record = RecordDescriptor::new("Guarded", "Guarded", vec![hidden, FieldDescriptor::new("open", int())]);
        let schema = build(&record, &mut GeneratedTypesRegistry::new());
        let excluded: Vec<&ExcludedField> = schema.excluded().collect();
        assert_eq!(excluded.len(), 1);
        assert!(excluded[0].kind.is_none());
        assert_eq!(excluded[0].diagnostic.kind, DiagnosticKind::NonPublicSkipped);
    }

    #[test]
    fn test_matrix_diagnostic() {
        let record = RecordDescriptor::new(
            "Grid",
            "Grid",
            vec![FieldDescriptor::new(
                "cells",
                TypeDescriptor::constant_array(TypeDescriptor::constant_array(int(), 3), 3),
            )],
        );
        let schema = build(&record, &mut GeneratedTypesRegistry::new());
        let excluded: Vec<&ExcludedField> = schema.excluded().collect();
        assert_eq!(excluded[0].matrix, Some(MatrixShape::CStyle2D));
        assert!(matches!(excluded[0].diagnostic.kind, DiagnosticKind::MatrixNotWired { .. }));
    }

    #[test]
    fn test_double_pointer_reported_as_matrix() {
        let record = RecordDescriptor::new(
            "Raw",
            "Raw",
            vec![FieldDescriptor::new("rows", TypeDescriptor::pointer_to(TypeDescriptor::pointer_to(int())))],
        );
        let schema = build(&record, &mut GeneratedTypesRegistry::new());
        assert_eq!(schema.entries().count(), 0);
        let excluded: Vec<&ExcludedField> = schema.excluded().collect();
        assert_eq!(excluded[0].matrix, Some(MatrixShape::CStyle2D));
        assert_eq!(
            excluded[0].diagnostic.kind,
            DiagnosticKind::MatrixNotWired { type_name: "int * *".into(), shape: MatrixShape::CStyle2D }
        );
    }

    #[test]
    fn test_shadowed_nested_record_excluded() {
        let mut registry = GeneratedTypesRegistry::new();
        let inner = RecordDescriptor::new(
            "Inner",
            "ns::Inner",
            vec![FieldDescriptor::new("v", TypeDescriptor::template("std::vector<int>", "std::vector", &["int"]))],
        );
        build(&inner, &mut registry);
        let outer = RecordDescriptor::new(
            "Outer",
            "ns::Outer",
            vec![FieldDescriptor::new("x", int()), FieldDescriptor::new("inner", TypeDescriptor::record("Inner", "ns::Inner"))],
        );
        let schema = build(&outer, &mut registry);

        assert!(!schema.needs_shadow);
        assert_eq!(schema.entries().map(|e| e.field.as_str()).collect::<Vec<_>>(), vec!["x"]);
        let excluded: Vec<&ExcludedField> = schema.excluded().collect();
        assert_eq!(excluded[0].field, "inner");
        assert_eq!(
            excluded[0].diagnostic.kind,
            DiagnosticKind::ShadowedNestedRecord { record: "ns::Inner".into() }
        );
    }

    #[test]
    fn test_unresolved_nested_record_stays_in_schema() {
        let record = RecordDescriptor::new(
            "Outer",
            "Outer",
            vec![FieldDescriptor::new("inner", TypeDescriptor::record("Inner", "Inner"))],
        );
        let schema = build(&record, &mut GeneratedTypesRegistry::new());
        let entry = schema.entry("inner").expect("deferred entry");
        assert_eq!(entry.kind, FieldKind::DeferredUnresolved { record: "Inner".into() });
        assert!(matches!(entry.diagnostics[0].kind, DiagnosticKind::UnresolvedNestedType { .. }));
    }

    #[test]
    fn test_self_reference_is_not_resolved() {
        let record = RecordDescriptor::new(
            "Node",
            "Node",
            vec![FieldDescriptor::new("next", TypeDescriptor::pointer_to(TypeDescriptor::record("Node", "Node")))],
        );
        let mut registry = GeneratedTypesRegistry::new();
        let schema = build(&record, &mut registry);
        assert_eq!(schema.entry("next").map(|e| &e.kind), Some(&FieldKind::DeferredUnresolved { record: "Node".into() }));
        assert!(registry.contains("Node"));
    }

    #[test]
    fn test_symbols_for_nested_names() {
        assert_eq!(schema_symbol("Outer::Inner"), "Outer_Inner_h5type");
        assert_eq!(shadow_name("::Outer::Inner"), "Outer_Inner_hvl");
        assert_eq!(sanitize_identifier("Pair<int, 2>"), "Pair_int__2_");
    }
}
