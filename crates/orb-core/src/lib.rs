//! Orbstare Core - Types, formulas, analytics vocabulary, and error handling

pub mod effects;
pub mod error;
pub mod events;
pub mod narration;
pub mod types;

pub use effects::BackgroundEffects;
pub use error::{Error, Result};
pub use events::*;
pub use types::*;
