//! Record Descriptor Definitions
//!
//! This crate contains the structured descriptors an introspector produces for
//! record (struct/class) and enumeration declarations. It provides pure data
//! structures without any file I/O, classification or code generation logic.

pub mod descriptor;
pub mod tokens;

// Re-export commonly used types at the crate root
pub use descriptor::*;
pub use tokens::*;
