use crate::schema::shadow::{PackStep, ShadowLayout, UnpackStep};
use crate::schema::diagnostic::Diagnostic;
use std::fmt::Write;

/* Render the shadow class: handles, pack constructor, release of owned buffers, get_base() */
pub fn emit_shadow_class(shadow: &ShadowLayout) -> String {
  let mut out = String::new();
  let name = &shadow.name;
  let base = &shadow.base;
  let not_implemented = shadow.diagnostics();

  writeln!(out, "/// fixed-size stand-in for `{}`, variable-length fields are mirrored by hvl_t handles", base).unwrap();
  writeln!(out, "class {} : public {}", name, base).unwrap();
  writeln!(out, "{{").unwrap();
  writeln!(out, "public:").unwrap();
  for handle in &shadow.handles {
    writeln!(out, "    hvl_t {};", handle.name).unwrap();
  }
  out.push('\n');

  /* Default constructor, target of reads */
  writeln!(out, "    {}()", name).unwrap();
  writeln!(out, "    {{").unwrap();
  for handle in &shadow.handles {
    writeln!(out, "        {}.p = nullptr;", handle.name).unwrap();
    writeln!(out, "        {}.len = 0;", handle.name).unwrap();
  }
  writeln!(out, "    }}").unwrap();
  out.push('\n');

  /* Pack: vector handles borrow from obj, text handles own a copy */
  writeln!(out, "    /// vector handles point into `obj`, which must outlive this object").unwrap();
  writeln!(out, "    explicit {}(const {}& obj) : {}(obj)", name, base, base).unwrap();
  writeln!(out, "    {{").unwrap();
  for step in &shadow.pack {
    match step {
      PackStep::BorrowBuffer { field, handle } => {
        writeln!(out, "        {}.p = const_cast<void*>(static_cast<const void*>(obj.{}.data()));", handle, field).unwrap();
        writeln!(out, "        {}.len = obj.{}.size();", handle, field).unwrap();
      }
      PackStep::CopyText { field, handle } => {
        writeln!(out, "        {}.len = obj.{}.size() + 1;", handle, field).unwrap();
        writeln!(out, "        {}.p = std::malloc({}.len);", handle, handle).unwrap();
        writeln!(out, "        std::memcpy({}.p, obj.{}.c_str(), {}.len);", handle, field, handle).unwrap();
      }
    }
  }
  writeln!(out, "    }}").unwrap();

  if shadow.owns_buffers() {
    out.push('\n');
    writeln!(out, "    {}(const {}&) = delete;", name, name).unwrap();
    writeln!(out, "    {}& operator=(const {}&) = delete;", name, name).unwrap();
    out.push('\n');
    writeln!(out, "    ~{}()", name).unwrap();
    writeln!(out, "    {{").unwrap();
    for handle in shadow.owned_handles() {
      writeln!(out, "        std::free({}.p);", handle.name).unwrap();
    }
    writeln!(out, "    }}").unwrap();
  }
  out.push('\n');

  /* Unpack */
  writeln!(out, "    {} get_base() const", base).unwrap();
  writeln!(out, "    {{").unwrap();
  writeln!(out, "        {} obj(*this);", base).unwrap();
  for step in &shadow.unpack {
    match step {
      UnpackStep::AssignVector { field, handle, element_type } => {
        writeln!(out, "        auto {}_ptr = static_cast<const {}*>({}.p);", field, element_type, handle).unwrap();
        writeln!(out, "        obj.{}.assign({}_ptr, {}_ptr + {}.len);", field, field, field, handle).unwrap();
      }
      UnpackStep::NotImplemented { field, .. } => {
        let comment = not_implemented
          .iter()
          .find(|d| d.field.as_deref() == Some(field.as_str()))
          .map(Diagnostic::to_comment)
          .unwrap_or_default();
        writeln!(out, "        {}", comment).unwrap();
      }
    }
  }
  writeln!(out, "        return obj;").unwrap();
  writeln!(out, "    }}").unwrap();
  writeln!(out, "}};").unwrap();
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::builder::RecordSchemaBuilder;
  use crate::schema::classify::FieldClassifier;
  use crate::schema::registry::GeneratedTypesRegistry;
  use crate::schema::shadow::ShadowRecordSynthesizer;
  use h5gen_types::{BuiltinKind, FieldDescriptor, RecordDescriptor, TypeDescriptor};

  fn shadow_for(fields: Vec<FieldDescriptor>) -> ShadowLayout {
    let record = RecordDescriptor::new("Sample", "Sample", fields);
    let classifier = FieldClassifier::default();
    let schema = RecordSchemaBuilder::new(&classifier).build(&record, &mut GeneratedTypesRegistry::new());
    ShadowRecordSynthesizer::synthesize(&record, &schema)
  }

  #[test]
  fn test_string_handle_is_owned_and_released() {
    let shadow = shadow_for(vec![
      FieldDescriptor::new("id", TypeDescriptor::builtin("int", BuiltinKind::Int)),
      FieldDescriptor::new("name", TypeDescriptor::record("std::string", "std::string")),
    ]);
    let code = emit_shadow_class(&shadow);
    assert!(code.contains("class Sample_hvl : public Sample"));
    assert!(code.contains("hvl_t name_hvl;"));
    assert!(code.contains("name_hvl.len = obj.name.size() + 1;"));
    assert!(code.contains("name_hvl.p = std::malloc(name_hvl.len);"));
    assert!(code.contains("std::memcpy(name_hvl.p, obj.name.c_str(), name_hvl.len);"));
    assert!(code.contains("Sample_hvl(const Sample_hvl&) = delete;"));
    assert!(code.contains("std::free(name_hvl.p);"));
    assert!(code.contains("// TODO: Sample::name: NOT IMPLEMENTED: unpack of variable-length string `name`"));
    assert!(code.contains("Sample get_base() const"));
  }

  #[test]
  fn test_vector_handle_borrows_without_destructor() {
    let shadow = shadow_for(vec![FieldDescriptor::new(
      "values",
      TypeDescriptor::template("std::vector<double>", "std::vector", &["double"]),
    )]);
    let code = emit_shadow_class(&shadow);
    assert!(code.contains("values_hvl.p = const_cast<void*>(static_cast<const void*>(obj.values.data()));"));
    assert!(code.contains("values_hvl.len = obj.values.size();"));
    assert!(code.contains("auto values_ptr = static_cast<const double*>(values_hvl.p);"));
    assert!(code.contains("obj.values.assign(values_ptr, values_ptr + values_hvl.len);"));
    assert!(!code.contains("~Sample_hvl"));
    assert!(!code.contains("= delete"));
  }
}
