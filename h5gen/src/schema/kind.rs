use serde_derive::Serialize;
use std::fmt;

/// Element count of a fixed array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArrayLength {
    Literal(u64),
    /// A macro or constant spelled in the header
    Symbolic(String),
}

impl fmt::Display for ArrayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLength::Literal(n) => write!(f, "{}", n),
            ArrayLength::Symbolic(expr) => f.write_str(expr),
        }
    }
}

/// Representable shape of one field. Every field maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    #[serde(rename = "fixed-array-1d")]
    FixedArray1D { element_type: String, length: ArrayLength },
    VariableVector { element_type: String },
    VariableString,
    /// Raw character pointer, recordable but unsafe to round-trip
    CStyleString,
    SkippedSmartPointer { wrapper: String },
    Scalar { type_name: String },
    SkippedAnonymous,
    SkippedEnum { enum_name: String },
    NestedRecord { record: String, symbol: String },
    DeferredUnresolved { record: String },
    Unsupported { type_name: String },
}

impl FieldKind {
    /// Needs a handle in a shadow layout.
    pub fn is_variable_length(&self) -> bool {
        matches!(self, FieldKind::VariableVector { .. } | FieldKind::VariableString)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            FieldKind::SkippedSmartPointer { .. } | FieldKind::SkippedAnonymous | FieldKind::SkippedEnum { .. }
        )
    }

    /// Contributes an entry to the compound schema.
    pub fn is_schema_member(&self) -> bool {
        !self.is_skipped() && !matches!(self, FieldKind::Unsupported { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::FixedArray1D { .. } => "fixed-array-1d",
            FieldKind::VariableVector { .. } => "variable-vector",
            FieldKind::VariableString => "variable-string",
            FieldKind::CStyleString => "c-style-string",
            FieldKind::SkippedSmartPointer { .. } => "skipped-smart-pointer",
            FieldKind::Scalar { .. } => "scalar",
            FieldKind::SkippedAnonymous => "skipped-anonymous",
            FieldKind::SkippedEnum { .. } => "skipped-enum",
            FieldKind::NestedRecord { .. } => "nested-record",
            FieldKind::DeferredUnresolved { .. } => "deferred-unresolved",
            FieldKind::Unsupported { .. } => "unsupported",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::FixedArray1D { element_type, length } => write!(f, "{}[{}]", element_type, length),
            FieldKind::VariableVector { element_type } => write!(f, "vector<{}>", element_type),
            FieldKind::Scalar { type_name } => f.write_str(type_name),
            FieldKind::NestedRecord { record, .. } | FieldKind::DeferredUnresolved { record } => {
                write!(f, "{} ({})", record, self.label())
            }
            _ => f.write_str(self.label()),
        }
    }
}
