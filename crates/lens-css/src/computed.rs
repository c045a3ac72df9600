//! Computed style

use crate::{Declaration, Display, PropertyValue, Visibility};

/// Rendering-relevant computed style of one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            visibility: Visibility::Visible,
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    /// Initial style with an inherited `visibility`
    pub fn inheriting(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Self::default()
        }
    }

    /// Apply a declaration (later declarations win)
    pub fn apply_declaration(&mut self, decl: &Declaration) {
        match decl.value {
            PropertyValue::Display(display) => self.display = display,
            PropertyValue::Visibility(visibility) => self.visibility = visibility,
            PropertyValue::Opacity(opacity) => self.opacity = opacity.clamp(0.0, 1.0),
        }
    }

    /// Whether the element paints at all.
    ///
    /// False for `display: none`, `visibility: hidden` and an opacity of
    /// exactly zero. `collapse` still counts as rendered.
    pub fn is_rendered(&self) -> bool {
        self.display != Display::None
            && self.visibility != Visibility::Hidden
            && self.opacity != 0.0
    }
}
