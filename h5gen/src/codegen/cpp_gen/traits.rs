use crate::codegen::artifacts::{TraitEntry, TraitKind};
use crate::schema::builder::CompoundSchema;
use super::helpers::{deserializer_name, qualify, serializer_name};
use std::fmt::Write;

/* Trait rows for one record; serializer rows only exist for shadowed records */
pub fn trait_entries(schema: &CompoundSchema, with_serializers: bool) -> Vec<TraitEntry> {
  let mut entries = vec![TraitEntry {
    kind: TraitKind::Type,
    record_type: schema.type_name.clone(),
    target: schema.symbol.clone(),
  }];
  if schema.needs_shadow && with_serializers {
    entries.push(TraitEntry {
      kind: TraitKind::Serializer,
      record_type: schema.type_name.clone(),
      target: serializer_name(&schema.type_name),
    });
    entries.push(TraitEntry {
      kind: TraitKind::Deserializer,
      record_type: schema.type_name.clone(),
      target: deserializer_name(&schema.type_name),
    });
  }
  entries
}

/* Specialization inside `namespace HDF5` */
pub fn emit_trait(entry: &TraitEntry, namespace: Option<&str>) -> String {
  let record = qualify(namespace, &entry.record_type);
  let target = qualify(namespace, &entry.target);
  let (trait_name, return_type, value) = match entry.kind {
    TraitKind::Type => ("to_h5type", "const H5::DataType*".to_string(), format!("&{}", target)),
    TraitKind::Serializer => ("to_h5serializer", format!("const Serializer<{}>", record), target),
    TraitKind::Deserializer => ("to_h5deserializer", format!("const Deserializer<{}>", record), target),
  };

  let mut out = String::new();
  writeln!(out, "template <>").unwrap();
  writeln!(out, "struct {}<{}>", trait_name, record).unwrap();
  writeln!(out, "{{").unwrap();
  writeln!(out, "    static inline {} get(void)", return_type).unwrap();
  writeln!(out, "    {{").unwrap();
  writeln!(out, "        return {};", value).unwrap();
  writeln!(out, "    }}").unwrap();
  writeln!(out, "}};").unwrap();
  out
}
