use crate::schema::builder::sanitize_identifier;

pub const INDENT: &str = "    ";

/* Element type handle through the traits header */
pub fn to_h5t(type_name: &str) -> String {
  format!("TO_H5T({})", type_name)
}

/* Local variable names inside init_h5types(), prefixed by the owning record */
pub fn local_dims_name(record_type: &str, field: &str) -> String {
  format!("{}_{}_dims", sanitize_identifier(record_type), field)
}

pub fn local_type_name(record_type: &str, field: &str) -> String {
  format!("{}_{}_h5type", sanitize_identifier(record_type), field)
}

pub fn serializer_name(record_type: &str) -> String {
  format!("{}_serialize", sanitize_identifier(record_type))
}

pub fn deserializer_name(record_type: &str) -> String {
  format!("{}_deserialize", sanitize_identifier(record_type))
}

/* Qualify `name` with the output namespace, `::name` when there is none */
pub fn qualify(namespace: Option<&str>, name: &str) -> String {
  match namespace {
    Some(ns) => format!("{}::{}", ns.trim_start_matches("::"), name),
    None => format!("::{}", name),
  }
}

/* Indent every non-empty line of `text` by `levels` */
pub fn indent_lines(text: &str, levels: usize) -> String {
  let prefix = INDENT.repeat(levels);
  let mut out = String::with_capacity(text.len() + text.lines().count() * prefix.len());
  for line in text.lines() {
    if !line.trim().is_empty() {
      out.push_str(&prefix);
      out.push_str(line);
    }
    out.push('\n');
  }
  out
}

pub fn open_namespace(namespace: Option<&str>) -> String {
  match namespace {
    Some(ns) => format!("namespace {}\n{{\n", ns.trim_start_matches("::")),
    None => String::new(),
  }
}

pub fn close_namespace(namespace: Option<&str>) -> String {
  match namespace {
    Some(ns) => format!("}} // namespace {}\n", ns.trim_start_matches("::")),
    None => String::new(),
  }
}
