pub mod actions;
pub mod classifier;
pub mod config;
pub mod error;
pub mod reducer;
pub mod render;
pub mod state;
pub mod style;

pub use actions::*;
pub use classifier::*;
pub use error::*;
pub use reducer::*;
pub use state::*;
pub use style::*;
