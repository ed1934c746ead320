// Library surface for the trainer core and its collaborators.
// Rendering and input widgets live outside this crate behind `render::Renderer`.
pub mod achievements;
pub mod app_dirs;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod error_tracker;
pub mod language;
pub mod notice;
pub mod progress;
pub mod render;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod timer;
pub mod trainer;
pub mod typing_policy;
pub mod word_generator;

pub use engine::SessionEngine;
pub use error::{Error, Result};
pub use session::Mode;
pub use trainer::Trainer;
