pub mod config;
pub mod display;
pub mod error;
pub mod registry;
pub mod render;
pub mod round;
pub mod runtime;

pub use config::{DisplayConfig, DisplayRole};
pub use error::{DisplayError, RoundError};
pub use runtime::run;
