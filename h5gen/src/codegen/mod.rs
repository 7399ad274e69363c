pub mod artifacts;
pub mod cpp;
pub mod cpp_gen;

pub use artifacts::{ArtifactEntry, GeneratedArtifacts, MemberEmission, RecordEmission, TraitEntry, TraitKind};
pub use cpp::{CppCodeGenerator, CppCodeGeneratorOptions, RenderedOutput};
