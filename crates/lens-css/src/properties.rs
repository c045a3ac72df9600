//! CSS Property Definitions
//!
//! Only the properties that decide whether an element renders at all.

/// Property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Display,
    Visibility,
    Opacity,
}

impl PropertyId {
    /// Parse a property name into a PropertyId
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "display" => Self::Display,
            "visibility" => Self::Visibility,
            "opacity" => Self::Opacity,
            _ => return None,
        })
    }

    /// Whether the computed value passes from parent to child
    pub fn is_inherited(self) -> bool {
        matches!(self, Self::Visibility)
    }
}

/// `display` keyword, reduced to what matters for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
    /// Table, ruby and other internal display types
    Other,
}

/// `visibility` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// Property value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Display(Display),
    Visibility(Visibility),
    Opacity(f32),
}

impl PropertyValue {
    /// Property this value belongs to
    pub fn property(&self) -> PropertyId {
        match self {
            Self::Display(_) => PropertyId::Display,
            Self::Visibility(_) => PropertyId::Visibility,
            Self::Opacity(_) => PropertyId::Opacity,
        }
    }
}
