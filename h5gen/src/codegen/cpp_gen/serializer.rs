use crate::schema::builder::CompoundSchema;
use super::helpers::{deserializer_name, serializer_name};
use std::fmt::Write;

const DATASPACE_PARAMS: &str = "const H5::DataSpace* memspace, const H5::DataSpace* space";

fn serializer_signature(schema: &CompoundSchema) -> String {
  format!(
    "void {}({}& obj, H5::DataSet& dataset, {})",
    serializer_name(&schema.type_name),
    schema.type_name,
    DATASPACE_PARAMS
  )
}

fn deserializer_signature(schema: &CompoundSchema) -> String {
  format!(
    "{} {}(H5::DataSet& dataset, {})",
    schema.type_name,
    deserializer_name(&schema.type_name),
    DATASPACE_PARAMS
  )
}

/* Prototypes matching HDF5::Serializer<T> and HDF5::Deserializer<T> */
pub fn emit_serializer_prototypes(schema: &CompoundSchema) -> String {
  let mut out = String::new();
  writeln!(out, "{};", serializer_signature(schema)).unwrap();
  writeln!(out, "{};", deserializer_signature(schema)).unwrap();
  out
}

/* Bodies go through the shadow: pack before write, read then get_base() */
pub fn emit_serializer_bodies(schema: &CompoundSchema, inline: bool) -> String {
  let specifier = if inline { "inline " } else { "" };
  let shadow = &schema.shadow_name;
  let symbol = &schema.symbol;
  let mut out = String::new();

  writeln!(out, "{}{}", specifier, serializer_signature(schema)).unwrap();
  writeln!(out, "{{").unwrap();
  writeln!(out, "    {} tmp(obj);", shadow).unwrap();
  writeln!(out, "    if (memspace && space)").unwrap();
  writeln!(out, "        dataset.write(&tmp, {}, *memspace, *space);", symbol).unwrap();
  writeln!(out, "    else").unwrap();
  writeln!(out, "        dataset.write(&tmp, {});", symbol).unwrap();
  writeln!(out, "}}").unwrap();
  out.push('\n');

  writeln!(out, "{}{}", specifier, deserializer_signature(schema)).unwrap();
  writeln!(out, "{{").unwrap();
  writeln!(out, "    {} tmp;", shadow).unwrap();
  writeln!(out, "    if (memspace && space)").unwrap();
  writeln!(out, "        dataset.read(&tmp, {}, *memspace, *space);", symbol).unwrap();
  writeln!(out, "    else").unwrap();
  writeln!(out, "        dataset.read(&tmp, {});", symbol).unwrap();
  writeln!(out, "    return tmp.get_base();").unwrap();
  writeln!(out, "}}").unwrap();
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::builder::RecordSchemaBuilder;
  use crate::schema::classify::FieldClassifier;
  use crate::schema::registry::GeneratedTypesRegistry;
  use h5gen_types::{FieldDescriptor, RecordDescriptor, TypeDescriptor};

  fn schema() -> CompoundSchema {
    let record = RecordDescriptor::new(
      "Named",
      "Named",
      vec![FieldDescriptor::new("name", TypeDescriptor::record("std::string", "std::string"))],
    );
    let classifier = FieldClassifier::default();
    RecordSchemaBuilder::new(&classifier).build(&record, &mut GeneratedTypesRegistry::new())
  }

  #[test]
  fn test_prototypes() {
    let protos = emit_serializer_prototypes(&schema());
    assert!(protos.contains(
      "void Named_serialize(Named& obj, H5::DataSet& dataset, const H5::DataSpace* memspace, const H5::DataSpace* space);"
    ));
    assert!(protos.contains(
      "Named Named_deserialize(H5::DataSet& dataset, const H5::DataSpace* memspace, const H5::DataSpace* space);"
    ));
  }

  #[test]
  fn test_deserializer_reads() {
    let bodies = emit_serializer_bodies(&schema(), true);
    assert!(bodies.starts_with("inline void Named_serialize("));
    assert!(bodies.contains("Named_hvl tmp(obj);"));
    assert!(bodies.contains("dataset.write(&tmp, Named_h5type, *memspace, *space);"));
    assert!(bodies.contains("dataset.read(&tmp, Named_h5type, *memspace, *space);"));
    assert!(bodies.contains("return tmp.get_base();"));
    assert_eq!(bodies.matches("dataset.write").count(), 2);
  }
}
