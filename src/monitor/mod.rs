//! Monitor core: per-target state, history and the transition engine.

mod engine;
mod history;
mod state;

pub use engine::*;
pub use history::*;
pub use state::*;
