pub mod helpers;
pub mod members;
pub mod serializer;
pub mod shadow;
pub mod traits;
pub mod types;

// Re-export main public functions
pub use members::{emit_excluded, emit_member, emit_members};
pub use serializer::{emit_serializer_bodies, emit_serializer_prototypes};
pub use shadow::emit_shadow_class;
pub use traits::{emit_trait, trait_entries};
pub use types::{DeclarationStyle, emit_init_routine, emit_registrations, emit_type_declaration};
