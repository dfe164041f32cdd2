//! Presentation of each known type: color, marker, opacity, display
//! name and line style.
//!
//! A [`StyleRegistry`] is an immutable table handed to the renderers;
//! nothing here is global state.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: &'static str,
    /// Matplotlib marker code.  Not drawn by the current charts.
    pub marker: &'static str,
    pub alpha: f64,
    /// Name shown in the legend.
    pub name: &'static str,
    /// Matplotlib line style, e.g. "-" or "--".
    pub linestyle: &'static str,
}

const fn style(color: &'static str, marker: &'static str, alpha: f64,
               name: &'static str, linestyle: &'static str) -> Style {
    Style { color, marker, alpha, name, linestyle }
}

/// Cache organizations drawn by the histogram renderer.
pub const CACHE_LAYOUTS: &[(&str, Style)] = &[
    ("ft",                  style("#de2d26", "s", 1., "FT", "-")),
    ("ft_holes",            style("#31a354", "o", 1., "FT with holes", "-")),
    ("ft_blocked_64",       style("#de2d26", "o", 1., "FT blocked 64", "-")),
    ("ft_blocked_64_holes", style("#31a354", "o", 1.,
                                  "FT blocked 64 with holes", "-")),
    ("st_td",               style("#3182bd", "o", 1., "ST top-down", "-")),
    ("st_bu",               style("#fe9929", "o", 1., "ST bottom-up", "-")),
];

/// Containers drawn by the timing renderer.
pub const CONTAINERS: &[(&str, Style)] = &[
    ("std::set",      style("#de2d26", "s", 1., "std::set", "-")),
    ("sorted_vector", style("#31a354", "o", 1., "sorted_vector", "-")),
];

#[derive(Debug, Clone, Copy)]
pub struct StyleRegistry {
    entries: &'static [(&'static str, Style)],
}

impl StyleRegistry {
    pub const fn new(entries: &'static [(&'static str, Style)]) -> Self {
        StyleRegistry { entries }
    }

    pub const fn cache_layouts() -> Self {
        Self::new(CACHE_LAYOUTS)
    }

    pub const fn containers() -> Self {
        Self::new(CONTAINERS)
    }

    /// Style of `kind`, or [`Error::UnknownType`].
    pub fn get(&self, kind: &str) -> Result<&'static Style> {
        self.entries.iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s)
            .ok_or_else(|| Error::UnknownType(kind.to_owned()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(k, _)| *k)
    }
}
