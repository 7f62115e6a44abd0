//! Static lookup tables for the subject editor: pastel colors and icons.

use std::fmt;

/// A named color offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastelColor {
    pub name: &'static str,
    pub value: &'static str,
}

pub const PASTEL_COLORS: [PastelColor; 10] = [
    PastelColor {
        name: "Mint Green",
        value: "#A7E9AF",
    },
    PastelColor {
        name: "Lavender",
        value: "#E6E6FA",
    },
    PastelColor {
        name: "Peach",
        value: "#FFDAB9",
    },
    PastelColor {
        name: "Sky Blue",
        value: "#ADD8E6",
    },
    PastelColor {
        name: "Soft Yellow",
        value: "#FAFAD2",
    },
    PastelColor {
        name: "Light Pink",
        value: "#FFB6C1",
    },
    PastelColor {
        name: "Pale Turquoise",
        value: "#AFEEEE",
    },
    PastelColor {
        name: "Light Coral",
        value: "#F08080",
    },
    PastelColor {
        name: "Tea Green",
        value: "#D0F0C0",
    },
    PastelColor {
        name: "Periwinkle",
        value: "#CCCCFF",
    },
];

pub const DEFAULT_SUBJECT_COLOR: &str = PASTEL_COLORS[0].value;

/// Looks up the catalog name for a color value, ignoring hex case.
#[must_use]
pub fn color_name(value: &str) -> Option<&'static str> {
    PASTEL_COLORS
        .iter()
        .find(|c| c.value.eq_ignore_ascii_case(value))
        .map(|c| c.name)
}

/// Icons selectable for a subject.
///
/// Subjects store the icon as a free string key; [`SubjectIcon::resolve`] maps
/// any key to a variant, using [`SubjectIcon::BookOpen`] for unknown keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubjectIcon {
    #[default]
    BookOpen,
    Code2,
    Palette,
    Music2,
    Brain,
    FlaskConical,
    Target,
    Feather,
    Star,
    Zap,
    Leaf,
    Sun,
    Moon,
    Coffee,
}

impl SubjectIcon {
    pub const ALL: [SubjectIcon; 14] = [
        SubjectIcon::BookOpen,
        SubjectIcon::Code2,
        SubjectIcon::Palette,
        SubjectIcon::Music2,
        SubjectIcon::Brain,
        SubjectIcon::FlaskConical,
        SubjectIcon::Target,
        SubjectIcon::Feather,
        SubjectIcon::Star,
        SubjectIcon::Zap,
        SubjectIcon::Leaf,
        SubjectIcon::Sun,
        SubjectIcon::Moon,
        SubjectIcon::Coffee,
    ];

    /// The catalog key stored on subjects.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SubjectIcon::BookOpen => "BookOpen",
            SubjectIcon::Code2 => "Code2",
            SubjectIcon::Palette => "Palette",
            SubjectIcon::Music2 => "Music2",
            SubjectIcon::Brain => "Brain",
            SubjectIcon::FlaskConical => "FlaskConical",
            SubjectIcon::Target => "Target",
            SubjectIcon::Feather => "Feather",
            SubjectIcon::Star => "Star",
            SubjectIcon::Zap => "Zap",
            SubjectIcon::Leaf => "Leaf",
            SubjectIcon::Sun => "Sun",
            SubjectIcon::Moon => "Moon",
            SubjectIcon::Coffee => "Coffee",
        }
    }

    /// Exact-match lookup by catalog key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|icon| icon.name() == name)
    }

    /// Total lookup: unknown keys resolve to the default icon.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// Single-character glyph used by text front ends.
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            SubjectIcon::BookOpen => '📖',
            SubjectIcon::Code2 => '💻',
            SubjectIcon::Palette => '🎨',
            SubjectIcon::Music2 => '🎵',
            SubjectIcon::Brain => '🧠',
            SubjectIcon::FlaskConical => '🧪',
            SubjectIcon::Target => '🎯',
            SubjectIcon::Feather => '🪶',
            SubjectIcon::Star => '⭐',
            SubjectIcon::Zap => '⚡',
            SubjectIcon::Leaf => '🍃',
            SubjectIcon::Sun => '🌞',
            SubjectIcon::Moon => '🌙',
            SubjectIcon::Coffee => '☕',
        }
    }
}

pub const DEFAULT_ICON: SubjectIcon = SubjectIcon::BookOpen;

impl fmt::Display for SubjectIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_book_open() {
        assert_eq!(SubjectIcon::resolve("Code2"), SubjectIcon::Code2);
        assert_eq!(SubjectIcon::resolve("code2"), SubjectIcon::BookOpen);
        assert_eq!(SubjectIcon::resolve(""), SubjectIcon::BookOpen);
    }

    #[test]
    fn every_icon_round_trips_through_its_name() {
        for icon in SubjectIcon::ALL {
            assert_eq!(SubjectIcon::from_name(icon.name()), Some(icon));
        }
    }

    #[test]
    fn default_color_is_first_catalog_entry() {
        assert_eq!(DEFAULT_SUBJECT_COLOR, "#A7E9AF");
        assert_eq!(color_name("#ffdab9"), Some("Peach"));
        assert_eq!(color_name("#123456"), None);
    }
}
