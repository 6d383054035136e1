//! Media file inspection and validation module

pub mod inspector;
pub mod validator;

pub use inspector::StreamInspector;
pub use validator::{CompatibilityReport, CompatibilityValidator};
