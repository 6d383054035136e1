// Application layer - Clip and reel lifecycle

use uuid::Uuid;

pub mod clip_interactor;
pub mod container;
pub mod reel_interactor;
pub mod snapshot;

// Re-export managers
pub use clip_interactor::ClipManager;
pub use container::{AppContainer, DefaultAppContainer};
pub use reel_interactor::ReelManager;

/// `<prefix>_<12 hex chars>` from a fresh random UUID
pub fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids() {
        let a = generate_id("clip");
        let b = generate_id("clip");
        assert_ne!(a, b);
        assert_eq!(a.len(), "clip_".len() + 12);
        assert!(a["clip_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(generate_id("reel").starts_with("reel_"));
    }
}
