//! Output verification and transient-file lifetime

pub mod artifacts;
pub mod verifier;

pub use artifacts::ArtifactGuard;
pub use verifier::{OutputCheck, OutputVerifier};
