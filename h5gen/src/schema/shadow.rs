use crate::schema::builder::{CompoundSchema, handle_name};
use crate::schema::diagnostic::{Diagnostic, DiagnosticKind};
use crate::schema::kind::FieldKind;
use h5gen_types::RecordDescriptor;
use serde_derive::Serialize;

/// Who releases the buffer a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleOwnership {
    /// Points into the source object; valid only while the source lives
    Borrowed,
    /// Allocated by pack; released by the shadow destructor
    Owned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "payload", rename_all = "kebab-case")]
pub enum HandlePayload {
    Vector { element_type: String },
    Text,
}

/// `hvl_t` member standing in for one variable-length field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct HandleField {
    pub source_field: String,
    pub name: String,
    pub ownership: HandleOwnership,
    #[serde(flatten)]
    pub payload: HandlePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum PackStep {
    /// `handle.p = source.data(); handle.len = source.size();`
    BorrowBuffer { field: String, handle: String },
    /// Allocate `size() + 1` bytes and copy the NUL-terminated text
    CopyText { field: String, handle: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum UnpackStep {
    AssignVector { field: String, handle: String, element_type: String },
    NotImplemented { field: String, handle: String },
}

/// Fixed-size stand-in for a record with variable-length fields. It derives
/// from the record, so inherited fields keep their offsets, and appends one
/// handle per variable-length field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowLayout {
    pub record: String,
    pub name: String,
    pub base: String,
    pub inherited_fields: Vec<String>,
    pub handles: Vec<HandleField>,
    pub pack: Vec<PackStep>,
    pub unpack: Vec<UnpackStep>,
}

impl ShadowLayout {
    pub fn owns_buffers(&self) -> bool {
        self.handles.iter().any(|h| h.ownership == HandleOwnership::Owned)
    }

    pub fn owned_handles(&self) -> impl Iterator<Item = &HandleField> {
        self.handles.iter().filter(|h| h.ownership == HandleOwnership::Owned)
    }

    /// One `NotImplemented` per unpack step without a generated body.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.unpack
            .iter()
            .filter_map(|step| match step {
                UnpackStep::NotImplemented { field, .. } => Some(Diagnostic::field(
                    &self.record,
                    field,
                    DiagnosticKind::NotImplemented { what: format!("unpack of variable-length string `{}`", field) },
                )),
                UnpackStep::AssignVector { .. } => None,
            })
            .collect()
    }
}

pub struct ShadowRecordSynthesizer;

impl ShadowRecordSynthesizer {
    /// Only called for schemas with `needs_shadow` set; every variable-length
    /// entry is a vector or a string by construction.
    pub fn synthesize(record: &RecordDescriptor, schema: &CompoundSchema) -> ShadowLayout {
        debug_assert!(schema.needs_shadow, "shadow requested for {} without variable-length fields", schema.record);

        let mut handles = Vec::new();
        let mut pack = Vec::new();
        let mut unpack = Vec::new();

        for entry in schema.variable_entries() {
            let handle = handle_name(&entry.field);
            match &entry.kind {
                FieldKind::VariableVector { element_type } => {
                    handles.push(HandleField {
                        source_field: entry.field.clone(),
                        name: handle.clone(),
                        ownership: HandleOwnership::Borrowed,
                        payload: HandlePayload::Vector { element_type: element_type.clone() },
                    });
                    pack.push(PackStep::BorrowBuffer { field: entry.field.clone(), handle: handle.clone() });
                    unpack.push(UnpackStep::AssignVector {
                        field: entry.field.clone(),
                        handle,
                        element_type: element_type.clone(),
                    });
                }
                FieldKind::VariableString => {
                    handles.push(HandleField {
                        source_field: entry.field.clone(),
                        name: handle.clone(),
                        ownership: HandleOwnership::Owned,
                        payload: HandlePayload::Text,
                    });
                    pack.push(PackStep::CopyText { field: entry.field.clone(), handle: handle.clone() });
                    unpack.push(UnpackStep::NotImplemented { field: entry.field.clone(), handle });
                }
                other => unreachable!("variable-length entry with kind {}", other.label()),
            }
        }

        ShadowLayout {
            record: schema.record.clone(),
            name: schema.shadow_name.clone(),
            base: record.name.clone(),
            inherited_fields: record.public_fields().map(|f| f.name.clone()).collect(),
            handles,
            pack,
            unpack,
        }
    }
}
