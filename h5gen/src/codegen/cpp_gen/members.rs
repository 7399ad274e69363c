use crate::codegen::artifacts::MemberEmission;
use crate::schema::builder::{CompoundSchema, ExcludedField, FieldOutcome, SchemaEntry};
use crate::schema::diagnostic::{Diagnostic, DiagnosticKind};
use crate::schema::kind::FieldKind;
use crate::schema::registry::GeneratedTypesRegistry;
use super::helpers::{local_dims_name, local_type_name, to_h5t};

fn insert_member(symbol: &str, entry: &SchemaEntry, member_type: &str) -> String {
  format!(
    "{}.insertMember(\"{}\", {}, {});",
    symbol,
    entry.field,
    entry.offset.to_hoffset(),
    member_type
  )
}

/* One field of a schema: a registration statement, or a comment when it cannot be registered */
pub fn emit_member(
  schema: &CompoundSchema,
  entry: &SchemaEntry,
  registry: &GeneratedTypesRegistry,
) -> (MemberEmission, Vec<Diagnostic>) {
  let mut setup = Vec::new();
  let mut diagnostics: Vec<Diagnostic> = entry.diagnostics.clone();

  let registration = match &entry.kind {
    FieldKind::Scalar { type_name } => Some(insert_member(&schema.symbol, entry, &to_h5t(type_name))),
    FieldKind::FixedArray1D { element_type, length } => {
      let dims = local_dims_name(&schema.type_name, &entry.field);
      let array_type = local_type_name(&schema.type_name, &entry.field);
      setup.push(format!("hsize_t {}[] = {{{}}};", dims, length));
      setup.push(format!(
        "auto {} = H5::ArrayType({}, 1, {});",
        array_type,
        to_h5t(element_type),
        dims
      ));
      Some(insert_member(&schema.symbol, entry, &array_type))
    }
    FieldKind::VariableVector { element_type } => {
      let vlen_type = local_type_name(&schema.type_name, &entry.field);
      setup.push(format!("auto {} = H5::VarLenType({});", vlen_type, to_h5t(element_type)));
      Some(insert_member(&schema.symbol, entry, &vlen_type))
    }
    FieldKind::VariableString => {
      let vlen_type = local_type_name(&schema.type_name, &entry.field);
      setup.push(format!("auto {} = H5::VarLenType({});", vlen_type, to_h5t("char")));
      Some(insert_member(&schema.symbol, entry, &vlen_type))
    }
    FieldKind::CStyleString => {
      let str_type = local_type_name(&schema.type_name, &entry.field);
      setup.push(format!("auto {} = H5::StrType(H5::PredType::C_S1, H5T_VARIABLE);", str_type));
      Some(insert_member(&schema.symbol, entry, &str_type))
    }
    FieldKind::NestedRecord { record, .. } => match registry.lookup(record) {
      Some(nested) => Some(insert_member(&schema.symbol, entry, &nested.symbol)),
      None => {
        diagnostics.push(Diagnostic::field(
          &schema.record,
          &entry.field,
          DiagnosticKind::UnresolvedNestedType { record: record.clone() },
        ));
        None
      }
    },
    /* Diagnostic already attached by the schema builder */
    FieldKind::DeferredUnresolved { .. } => None,
    FieldKind::SkippedSmartPointer { .. }
    | FieldKind::SkippedAnonymous
    | FieldKind::SkippedEnum { .. }
    | FieldKind::Unsupported { .. } => {
      diagnostics.push(Diagnostic::field(
        &schema.record,
        &entry.field,
        DiagnosticKind::UnsupportedType { type_name: entry.kind.to_string() },
      ));
      None
    }
  };

  let comments = diagnostics.iter().map(Diagnostic::to_comment).collect();
  (
    MemberEmission { field: entry.field.clone(), setup, registration, comments },
    diagnostics,
  )
}

/* Excluded fields leave only their diagnostic behind */
pub fn emit_excluded(excluded: &ExcludedField) -> MemberEmission {
  MemberEmission {
    field: excluded.field.clone(),
    setup: Vec::new(),
    registration: None,
    comments: vec![excluded.diagnostic.to_comment()],
  }
}

/* All fields of a schema in declaration order */
pub fn emit_members(
  schema: &CompoundSchema,
  registry: &GeneratedTypesRegistry,
) -> (Vec<MemberEmission>, Vec<Diagnostic>) {
  let mut members = Vec::with_capacity(schema.fields.len());
  let mut diagnostics = Vec::new();
  for outcome in &schema.fields {
    match outcome {
      FieldOutcome::Entry(entry) => {
        let (member, diags) = emit_member(schema, entry, registry);
        members.push(member);
        diagnostics.extend(diags);
      }
      FieldOutcome::Excluded(excluded) => {
        members.push(emit_excluded(excluded));
        diagnostics.push(excluded.diagnostic.clone());
      }
    }
  }
  (members, diagnostics)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::builder::RecordSchemaBuilder;
  use crate::schema::classify::FieldClassifier;
  use h5gen_types::{BuiltinKind, FieldDescriptor, RecordDescriptor, TypeDescriptor};

  fn int() -> TypeDescriptor {
    TypeDescriptor::builtin("int", BuiltinKind::Int)
  }

  fn emit(record: &RecordDescriptor, registry: &mut GeneratedTypesRegistry) -> (Vec<MemberEmission>, Vec<Diagnostic>) {
    let classifier = FieldClassifier::default();
    let schema = RecordSchemaBuilder::new(&classifier).build(record, registry);
    emit_members(&schema, registry)
  }

  #[test]
  fn test_fixed_array_emits_dims_and_array_type() {
    let record = RecordDescriptor::new(
      "CDataStruct",
      "CodeGen::CDataStruct",
      vec![FieldDescriptor::new(
        "scalar_array",
        TypeDescriptor::constant_array(TypeDescriptor::builtin("float", BuiltinKind::Float), 3),
      )],
    );
    let (members, diagnostics) = emit(&record, &mut GeneratedTypesRegistry::new());
    assert!(diagnostics.is_empty());
    assert_eq!(
      members[0].setup,
      vec![
        "hsize_t CDataStruct_scalar_array_dims[] = {3};".to_string(),
        "auto CDataStruct_scalar_array_h5type = H5::ArrayType(TO_H5T(float), 1, CDataStruct_scalar_array_dims);"
          .to_string(),
      ]
    );
    assert_eq!(
      members[0].registration.as_deref(),
      Some(
        "CDataStruct_h5type.insertMember(\"scalar_array\", HOFFSET(CDataStruct, scalar_array), CDataStruct_scalar_array_h5type);"
      )
    );
  }

  #[test]
  fn test_vector_registered_against_handle() {
    let record = RecordDescriptor::new(
      "Series",
      "Series",
      vec![
        FieldDescriptor::new("id", int()),
        FieldDescriptor::new("values", TypeDescriptor::template("std::vector<int>", "std::vector", &["int"])),
      ],
    );
    let (members, _) = emit(&record, &mut GeneratedTypesRegistry::new());
    assert_eq!(
      members[0].registration.as_deref(),
      Some("Series_h5type.insertMember(\"id\", HOFFSET(Series_hvl, id), TO_H5T(int));")
    );
    assert_eq!(members[1].setup, vec!["auto Series_values_h5type = H5::VarLenType(TO_H5T(int));".to_string()]);
    assert_eq!(
      members[1].registration.as_deref(),
      Some("Series_h5type.insertMember(\"values\", HOFFSET(Series_hvl, values_hvl), Series_values_h5type);")
    );
  }

  #[test]
  fn test_c_string_registers_with_warning() {
    let record = RecordDescriptor::new(
      "Tagged",
      "Tagged",
      vec![FieldDescriptor::new(
        "tag",
        TypeDescriptor::pointer_to(TypeDescriptor::builtin("const char", BuiltinKind::Char)),
      )],
    );
    let (members, diagnostics) = emit(&record, &mut GeneratedTypesRegistry::new());
    assert!(members[0].registration.is_some());
    assert!(members[0].setup[0].contains("H5::StrType(H5::PredType::C_S1, H5T_VARIABLE)"));
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnsafeCString);
  }

  #[test]
  fn test_deferred_nested_record_becomes_comment() {
    let record = RecordDescriptor::new(
      "Outer",
      "Outer",
      vec![FieldDescriptor::new("inner", TypeDescriptor::record("Inner", "Inner"))],
    );
    let (members, diagnostics) = emit(&record, &mut GeneratedTypesRegistry::new());
    assert!(members[0].registration.is_none());
    assert!(members[0].comments[0].starts_with("// WARNING: Outer::inner: record `Inner`"));
    assert_eq!(diagnostics.len(), 1);
  }

  #[test]
  fn test_nested_shadowed_record_is_not_registered() {
    let mut registry = GeneratedTypesRegistry::new();
    let inner = RecordDescriptor::new(
      "Inner",
      "Inner",
      vec![FieldDescriptor::new("v", TypeDescriptor::template("std::vector<int>", "std::vector", &["int"]))],
    );
    emit(&inner, &mut registry);
    let outer = RecordDescriptor::new(
      "Outer",
      "Outer",
      vec![
        FieldDescriptor::new("x", int()),
        FieldDescriptor::new("inner", TypeDescriptor::record("Inner", "Inner")),
      ],
    );
    let (members, diagnostics) = emit(&outer, &mut registry);
    assert!(members[0].registration.is_some());
    assert!(members[1].registration.is_none());
    assert!(members[1].setup.is_empty());
    assert_eq!(
      members[1].comments,
      vec![
        "// WARNING: Outer::inner: record `Inner` is stored through a shadow layout that does not match the member, field skipped"
          .to_string()
      ]
    );
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].kind, DiagnosticKind::ShadowedNestedRecord { .. }));
  }

  #[test]
  fn test_enum_field_comment() {
    let record = RecordDescriptor::new(
      "Painted",
      "Painted",
      vec![FieldDescriptor::new("color", TypeDescriptor::enumeration("Color", "Color", true))],
    );
    let (members, _) = emit(&record, &mut GeneratedTypesRegistry::new());
    assert_eq!(
      members[0].comments,
      vec!["// WARNING: Painted::color: enumeration `Color` is not supported, field skipped".to_string()]
    );
    assert_eq!(members[0].lines().count(), 1);
  }
}
