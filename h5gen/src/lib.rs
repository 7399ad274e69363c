//! HDF5 compound type generator for C++ records
//!
//! Record descriptors produced by a C++ introspector are classified field by
//! field, given a fixed layout (through a shadow class when a record holds
//! variable-length members), and rendered as C++ that builds one
//! `H5::CompType` per record.

pub mod cmds;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod provider;
pub mod schema;

pub use config::{ClassifierConfig, GeneratorConfig, OutputMode};
pub use driver::{Driver, GenerationOutput, RecordReport};
pub use error::{ConfigError, GenerateError, ProviderError};
pub use provider::{FileDescriptorProvider, TypeDescriptorProvider};
