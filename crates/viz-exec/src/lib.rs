pub mod contracts;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod interpreter;
pub mod simulated;
pub mod submit;

pub use contracts::*;
pub use dispatch::*;
pub use error::*;
pub use http::*;
pub use interpreter::*;
pub use simulated::*;
pub use submit::*;
