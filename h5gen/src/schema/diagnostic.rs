use serde_derive::Serialize;
use std::fmt;

use super::classify::MatrixShape;

/// Why a field or record did not make it into the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DiagnosticKind {
    SmartPointerSkipped { wrapper: String },
    AnonymousSkipped,
    EnumSkipped { enum_name: String },
    UnsupportedType { type_name: String },
    /// Two-dimensional shape recognised but not supported by emission
    MatrixNotWired { type_name: String, shape: MatrixShape },
    UnresolvedNestedType { record: String },
    UnsafeCString,
    NonPublicSkipped,
    TemplateRecordSkipped,
    /// Unpack of a text handle has no generated body
    NotImplemented { what: String },
    /// The nested compound type is sized for the shadow, not for the member
    ShadowedNestedRecord { record: String },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::SmartPointerSkipped { wrapper } => {
                write!(f, "smart pointer `{}` is not supported, field skipped", wrapper)
            }
            DiagnosticKind::AnonymousSkipped => f.write_str("anonymous field skipped"),
            DiagnosticKind::EnumSkipped { enum_name } => {
                write!(f, "enumeration `{}` is not supported, field skipped", enum_name)
            }
            DiagnosticKind::UnsupportedType { type_name } => {
                write!(f, "type `{}` is not supported, field skipped", type_name)
            }
            DiagnosticKind::MatrixNotWired { type_name, shape } => {
                write!(f, "`{}` is a {} matrix, matrix members are not supported, field skipped", type_name, shape)
            }
            DiagnosticKind::UnresolvedNestedType { record } => {
                write!(f, "record `{}` has no compound type yet, declare it before use", record)
            }
            DiagnosticKind::UnsafeCString => {
                f.write_str("raw character pointer stored as variable-length string, not safe to round-trip")
            }
            DiagnosticKind::NonPublicSkipped => f.write_str("non-public field skipped"),
            DiagnosticKind::TemplateRecordSkipped => f.write_str("template record skipped"),
            DiagnosticKind::NotImplemented { what } => write!(f, "NOT IMPLEMENTED: {}", what),
            DiagnosticKind::ShadowedNestedRecord { record } => write!(
                f,
                "record `{}` is stored through a shadow layout that does not match the member, field skipped",
                record
            ),
        }
    }
}

/// A non-fatal problem attached to a record and optionally one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Diagnostic {
    pub record: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn field(record: impl Into<String>, field: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self { record: record.into(), field: Some(field.into()), kind }
    }

    pub fn record(record: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self { record: record.into(), field: None, kind }
    }

    /// Line comment placed where the affected code would have been.
    pub fn to_comment(&self) -> String {
        let level = match self.kind {
            DiagnosticKind::NotImplemented { .. } => "TODO",
            _ => "WARNING",
        };
        format!("// {}: {}", level, self)
    }

    /// Log at warn level with record and field context.
    pub fn log(&self) {
        tracing::warn!(
            record = %self.record,
            field = self.field.as_deref().unwrap_or("-"),
            "{}",
            self.kind
        );
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}::{}: {}", self.record, field, self.kind),
            None => write!(f, "{}: {}", self.record, self.kind),
        }
    }
}
