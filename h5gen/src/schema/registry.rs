use indexmap::IndexMap;
use serde_derive::Serialize;
use tracing::warn;

/// Schema symbol recorded for a completed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegisteredType {
    pub symbol: String,
    /// The record's schema was built against a shadow layout
    pub shadowed: bool,
}

/// Records whose schema has already been built during the current run,
/// keyed by qualified name. Entries are only ever appended, in completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedTypesRegistry {
    entries: IndexMap<String, RegisteredType>,
}

impl GeneratedTypesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `qualified_name`. A second registration of the same name is
    /// ignored and reported; the first symbol stays authoritative.
    pub fn register(&mut self, qualified_name: &str, entry: RegisteredType) -> bool {
        if let Some(existing) = self.entries.get(qualified_name) {
            warn!(
                record = qualified_name,
                existing = %existing.symbol,
                "record registered twice, keeping first schema symbol"
            );
            return false;
        }
        self.entries.insert(qualified_name.to_string(), entry);
        true
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<&RegisteredType> {
        self.entries.get(qualified_name)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegisteredType)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}
