//! Replace inline `style` declarations with shared CSS classes.
//!
//! Existing single-class rules are reused when their declarations match; otherwise a
//! `cspfix_########` rule is appended to the generated stylesheet.

pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod model;
pub mod parser;
pub mod synthesizer;

pub mod style {
    pub mod cache;
    pub mod css_matcher;
    pub mod normalize;
    pub mod owned_css;
}

pub use config::{Config, Workspace};
pub use convert::{Conversion, Converter};
pub use error::{ConvertError, ConvertResult};
pub use host::{run_command, Host};
