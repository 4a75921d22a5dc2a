//! MRH Core Library
//!
//! Color ramps, coordinate transforms, gesture interpretation, and viewport
//! configuration for the multi-resolution heatmap viewer.

pub mod types;
pub mod error;
pub mod color;
pub mod coords;
pub mod gesture;
pub mod config;
pub mod controls;
pub mod query;
pub mod request;
pub mod settings;

// Re-export commonly used types and functions
pub use types::*;
pub use error::{MrhError, MrhResult};
pub use color::{Color, LinearRamp};
pub use config::{DataConfig, HeaderPolicy, MrhConfig, Source};
pub use gesture::{GestureCommand, GestureInterpreter, GestureSettings, PanCoalesce, PointerEvent};
pub use request::{FetchRequest, FetchResponse};
pub use settings::ViewerSettings;

/// Version information for the MRH core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
