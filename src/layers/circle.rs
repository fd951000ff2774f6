use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Stroke and fill styling for path layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            weight: 3.0,
            opacity: 1.0,
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
        }
    }
}

/// A circle with a radius in metres, drawn around a geographic centre
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    center: LatLng,
    radius: f64,
    style: PathStyle,
}

impl Circle {
    pub fn new(center: LatLng, radius: f64) -> Self {
        Self {
            center,
            radius,
            style: PathStyle::default(),
        }
    }

    pub fn with_style(mut self, style: PathStyle) -> Self {
        self.style = style;
        self
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }
}
