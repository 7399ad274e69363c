//! Generated text grouped per record, before it is assembled into files.

use crate::schema::diagnostic::Diagnostic;
use serde_derive::Serialize;

/// Output of one field: optional setup statements, then either a
/// registration or only comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemberEmission {
    pub field: String,
    pub setup: Vec<String>,
    pub registration: Option<String>,
    pub comments: Vec<String>,
}

impl MemberEmission {
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.comments.iter().chain(self.setup.iter()).chain(self.registration.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitKind {
    /// `HDF5::to_h5type<T>`
    Type,
    /// `HDF5::to_h5serializer<T>`
    Serializer,
    /// `HDF5::to_h5deserializer<T>`
    Deserializer,
}

/// One row of the trait table: a record type and the symbol it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TraitEntry {
    pub kind: TraitKind,
    pub record_type: String,
    pub target: String,
}

/// Everything emitted for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordEmission {
    pub record: String,
    pub type_name: String,
    pub symbol: String,
    pub size_expr: String,
    pub members: Vec<MemberEmission>,
    pub shadow_source: Option<String>,
    pub serializer_prototypes: Option<String>,
    pub serializer_bodies: Option<String>,
    pub traits: Vec<TraitEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RecordEmission {
    pub fn registrations(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| m.registration.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entry", rename_all = "kebab-case")]
pub enum ArtifactEntry {
    Record(RecordEmission),
    /// A declaration that produced no code, e.g. a template record
    Skipped(Diagnostic),
}

/// Generated text for a whole descriptor file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratedArtifacts {
    pub source_header: String,
    pub namespace: Option<String>,
    pub entries: Vec<ArtifactEntry>,
}

impl GeneratedArtifacts {
    pub fn new(source_header: impl Into<String>, namespace: Option<String>) -> Self {
        Self { source_header: source_header.into(), namespace, entries: Vec::new() }
    }

    pub fn push_record(&mut self, emission: RecordEmission) {
        self.entries.push(ArtifactEntry::Record(emission));
    }

    pub fn push_skipped(&mut self, diagnostic: Diagnostic) {
        self.entries.push(ArtifactEntry::Skipped(diagnostic));
    }

    pub fn records(&self) -> impl Iterator<Item = &RecordEmission> {
        self.entries.iter().filter_map(|entry| match entry {
            ArtifactEntry::Record(record) => Some(record),
            ArtifactEntry::Skipped(_) => None,
        })
    }

    pub fn record(&self, type_name: &str) -> Option<&RecordEmission> {
        self.records().find(|r| r.type_name == type_name)
    }

    pub fn trait_table(&self) -> impl Iterator<Item = &TraitEntry> {
        self.records().flat_map(|r| r.traits.iter())
    }

    /// Diagnostics of every record and skipped declaration, in order.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .flat_map(|entry| match entry {
                ArtifactEntry::Record(record) => record.diagnostics.iter().collect::<Vec<_>>(),
                ArtifactEntry::Skipped(diagnostic) => vec![diagnostic],
            })
            .collect()
    }
}
