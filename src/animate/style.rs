//! Animation styles and the static style catalog.

use std::fmt;

/// A supported animation aesthetic.
///
/// The set is closed: every style the generator can be asked for is listed
/// here, and each one has a matching entry in [`STYLE_CATALOG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    #[default]
    ClassicAnime,
    Pixar3d,
    AmericanCartoon,
    GraphicNovel,
}

impl Style {
    /// All styles, in catalog order.
    pub const ALL: [Style; 4] = [
        Style::ClassicAnime,
        Style::Pixar3d,
        Style::AmericanCartoon,
        Style::GraphicNovel,
    ];

    /// The label interpolated into the generation prompt.
    pub fn label(self) -> &'static str {
        match self {
            Style::ClassicAnime => "Classic 90s Anime",
            Style::Pixar3d => "3D Animation (Pixar Style)",
            Style::AmericanCartoon => "American Cartoon (Looney Tunes Style)",
            Style::GraphicNovel => "Graphic Novel (Bold lines, flat shading)",
        }
    }

    /// Short identifier used on the command line and in config files.
    pub fn slug(self) -> &'static str {
        match self {
            Style::ClassicAnime => "classic-anime",
            Style::Pixar3d => "pixar-3d",
            Style::AmericanCartoon => "american-cartoon",
            Style::GraphicNovel => "graphic-novel",
        }
    }

    /// Parse a slug back into a style.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.slug().eq_ignore_ascii_case(slug.trim()))
    }

    /// Catalog entry with display metadata for this style.
    pub fn option(self) -> &'static StyleOption {
        // ALL and STYLE_CATALOG share an order
        let index = Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default();
        &STYLE_CATALOG[index]
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display metadata for a style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOption {
    pub id: Style,
    pub name: &'static str,
    pub thumbnail: &'static str,
}

/// Every selectable style with its display name and thumbnail.
pub const STYLE_CATALOG: [StyleOption; 4] = [
    StyleOption {
        id: Style::ClassicAnime,
        name: "Classic Anime",
        thumbnail: "https://picsum.photos/seed/anime/200/200",
    },
    StyleOption {
        id: Style::Pixar3d,
        name: "Pixar Style 3D",
        thumbnail: "https://picsum.photos/seed/pixar/200/200",
    },
    StyleOption {
        id: Style::AmericanCartoon,
        name: "Looney Toons",
        thumbnail: "https://picsum.photos/seed/looney/200/200",
    },
    StyleOption {
        id: Style::GraphicNovel,
        name: "Graphic Novel",
        thumbnail: "https://picsum.photos/seed/novel/200/200",
    },
];
