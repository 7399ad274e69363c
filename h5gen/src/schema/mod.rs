pub mod builder;
pub mod classify;
pub mod diagnostic;
pub mod kind;
pub mod registry;
pub mod shadow;

pub use builder::{CompoundSchema, FieldOutcome, LayoutSide, RecordSchemaBuilder, SchemaEntry};
pub use classify::{FieldClassifier, MatrixShape};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use kind::{ArrayLength, FieldKind};
pub use registry::{GeneratedTypesRegistry, RegisteredType};
pub use shadow::{HandleOwnership, ShadowLayout, ShadowRecordSynthesizer};
