pub mod core;
pub mod selector;

// Re-export the main types for convenience
pub use core::{Tier, WordBank, WordBanks};
pub use selector::{FocusSelector, StandardSelector, WordSelector};
