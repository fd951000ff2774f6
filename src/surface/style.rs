//! Typed inline-style edits
//!
//! Controllers never write raw CSS text. They build a [`StylePatch`] of
//! typed properties and let the surface apply it to whatever elements a
//! selector matches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleProperty {
    Transform,
    TransformOrigin,
    Visibility,
    Opacity,
    Display,
    ZIndex,
    Position,
    Overflow,
    BackgroundColor,
    Color,
    FontWeight,
}

impl StyleProperty {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::Transform => "transform",
            StyleProperty::TransformOrigin => "transform-origin",
            StyleProperty::Visibility => "visibility",
            StyleProperty::Opacity => "opacity",
            StyleProperty::Display => "display",
            StyleProperty::ZIndex => "z-index",
            StyleProperty::Position => "position",
            StyleProperty::Overflow => "overflow",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::Color => "color",
            StyleProperty::FontWeight => "font-weight",
        }
    }
}

impl std::fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Ordered set of property assignments; `None` clears the property
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    entries: Vec<(StyleProperty, Option<String>)>,
}

impl StylePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: StyleProperty, value: impl Into<String>) -> Self {
        self.entries.push((property, Some(value.into())));
        self
    }

    pub fn clear(mut self, property: StyleProperty) -> Self {
        self.entries.push((property, None));
        self
    }

    pub fn entries(&self) -> &[(StyleProperty, Option<String>)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `transform: <t>` plus a centred origin
    pub fn transform(transform: Transform) -> Self {
        Self::new()
            .set(StyleProperty::Transform, transform.to_css())
            .set(StyleProperty::TransformOrigin, "center center")
    }

    /// `transform: none`, the explicit identity
    pub fn untransformed() -> Self {
        Self::new().set(StyleProperty::Transform, "none")
    }
}

/// 2D transform limited to a rotation followed by a uniform scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Clockwise rotation in degrees
    pub rotate_deg: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn new(rotate_deg: f64, scale: f64) -> Self {
        Self { rotate_deg, scale }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 1.0)
    }

    pub fn is_identity(&self) -> bool {
        self.rotate_deg == 0.0 && self.scale == 1.0
    }

    /// CSS text, e.g. `rotate(-90deg) scale(1.2)`
    pub fn to_css(&self) -> String {
        // Adding zero folds -0 into 0 so a zero heading prints `rotate(0deg)`.
        format!("rotate({}deg) scale({})", self.rotate_deg + 0.0, self.scale)
    }
}

/// Removes every `rotate(...)` function from a CSS transform list, keeping
/// the remaining functions in order.
pub fn strip_rotation(css: &str) -> String {
    let mut kept = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("rotate(") {
        kept.push_str(&rest[..start]);
        match rest[start..].find(')') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = "";
            }
        }
    }
    kept.push_str(rest);
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_css() {
        assert_eq!(Transform::new(-90.0, 1.5).to_css(), "rotate(-90deg) scale(1.5)");
        assert_eq!(Transform::new(-0.0, 1.0).to_css(), "rotate(0deg) scale(1)");
        assert!(Transform::identity().is_identity());
    }

    #[test]
    fn test_strip_rotation() {
        assert_eq!(
            strip_rotation("translate3d(10px, 20px, 0px) rotate(45deg)"),
            "translate3d(10px, 20px, 0px)"
        );
        assert_eq!(strip_rotation("rotate(10deg) scale(2) rotate(5deg)"), "scale(2)");
        assert_eq!(strip_rotation("scale(2)"), "scale(2)");
        assert_eq!(strip_rotation("rotate(10deg"), "");
    }

    #[test]
    fn test_patch_builders() {
        let patch = StylePatch::transform(Transform::new(30.0, 0.5));
        assert_eq!(patch.entries().len(), 2);
        assert_eq!(
            patch.entries()[0],
            (StyleProperty::Transform, Some("rotate(30deg) scale(0.5)".to_string()))
        );

        let cleared = StylePatch::new().clear(StyleProperty::Overflow);
        assert_eq!(cleared.entries()[0], (StyleProperty::Overflow, None));
        assert_eq!(StyleProperty::BackgroundColor.to_string(), "background-color");
    }
}
