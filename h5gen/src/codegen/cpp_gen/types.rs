use crate::codegen::artifacts::RecordEmission;
use super::helpers::{INDENT, indent_lines};
use std::fmt::Write;

/* How a compound type object is spelled at namespace scope */
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DeclarationStyle {
  /* `inline H5::CompType X_h5type(sizeof(X));`, header-only output */
  InlineDefinition,
  /* `extern H5::CompType X_h5type;` in a header */
  ExternDeclaration,
  /* `H5::CompType X_h5type(sizeof(X));` in a source file */
  Definition,
}

pub fn emit_type_declaration(record: &RecordEmission, style: DeclarationStyle) -> String {
  match style {
    DeclarationStyle::InlineDefinition => {
      format!("inline H5::CompType {}({});\n", record.symbol, record.size_expr)
    }
    DeclarationStyle::ExternDeclaration => format!("extern H5::CompType {};\n", record.symbol),
    DeclarationStyle::Definition => format!("H5::CompType {}({});\n", record.symbol, record.size_expr),
  }
}

/* Member registrations of one record, in field order */
pub fn emit_registrations(record: &RecordEmission) -> String {
  let mut out = String::new();
  writeln!(out, "// CompType members of {}", record.type_name).unwrap();
  for member in &record.members {
    for line in member.lines() {
      writeln!(out, "{}", line).unwrap();
    }
  }
  writeln!(out, "// end of CompType member definition for {}", record.type_name).unwrap();
  out
}

/* init_h5types(): every registration, with the offsetof warning silenced */
pub fn emit_init_routine<'a>(records: impl Iterator<Item = &'a RecordEmission>, inline: bool) -> String {
  let mut out = String::new();
  writeln!(out, "#if defined(__GNUC__)").unwrap();
  writeln!(out, "#pragma GCC diagnostic push").unwrap();
  writeln!(out, "#pragma GCC diagnostic ignored \"-Winvalid-offsetof\"").unwrap();
  writeln!(out, "#endif").unwrap();
  writeln!(out, "{}void init_h5types()", if inline { "inline " } else { "" }).unwrap();
  writeln!(out, "{{").unwrap();
  let mut first = true;
  for record in records {
    if !first {
      out.push('\n');
    }
    first = false;
    /* One scope per record, local dims and array types are named per record and field only */
    writeln!(out, "{}{{", INDENT).unwrap();
    out.push_str(&indent_lines(&emit_registrations(record), 2));
    writeln!(out, "{}}}", INDENT).unwrap();
  }
  writeln!(out, "}} // end of function init_h5types()").unwrap();
  writeln!(out, "#if defined(__GNUC__)").unwrap();
  writeln!(out, "#pragma GCC diagnostic pop").unwrap();
  writeln!(out, "#endif").unwrap();
  out
}
