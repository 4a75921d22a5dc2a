//! Tunable viewer behavior, loadable from any serde format.

use crate::config::HeaderPolicy;
use crate::coords::SCALE_FACTOR;
use crate::gesture::{GestureSettings, PanCoalesce, DEFAULT_DBLCLICK_ZOOM};
use crate::types::DEFAULT_RESOLUTION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Bases per unit of accumulated zoom
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Quiet period before a gesture burst is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Zoom units applied by a double-click
    #[serde(default = "default_dblclick_zoom")]
    pub dblclick_zoom: f64,

    /// How pan deltas inside one debounce window combine
    #[serde(default)]
    pub pan_coalesce: PanCoalesce,

    /// Fractions of the canvas width requested before the full-resolution layer
    #[serde(default = "default_blur_factors")]
    pub blur_factors: Vec<f64>,

    /// Resolution used when a request asks for zero
    #[serde(default = "default_resolution")]
    pub default_resolution: u32,

    /// Which header bounds the second axis
    #[serde(default)]
    pub header_policy: HeaderPolicy,

    /// Fill used when clearing the canvas for a new viewport
    #[serde(default = "default_background")]
    pub background: String,

    /// Embedded views never touch the address bar
    #[serde(default)]
    pub embedded: bool,
}

fn default_scale_factor() -> f64 { SCALE_FACTOR }
fn default_debounce_ms() -> u64 { 300 }
fn default_dblclick_zoom() -> f64 { DEFAULT_DBLCLICK_ZOOM }
fn default_blur_factors() -> Vec<f64> { vec![0.1, 0.2, 0.5] }
fn default_resolution() -> u32 { DEFAULT_RESOLUTION }
fn default_background() -> String { "#888888".to_string() }

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            debounce_ms: default_debounce_ms(),
            dblclick_zoom: default_dblclick_zoom(),
            pan_coalesce: PanCoalesce::default(),
            blur_factors: default_blur_factors(),
            default_resolution: default_resolution(),
            header_policy: HeaderPolicy::default(),
            background: default_background(),
            embedded: false,
        }
    }
}

impl ViewerSettings {
    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            dblclick_zoom: self.dblclick_zoom,
            pan_coalesce: self.pan_coalesce,
        }
    }
}
