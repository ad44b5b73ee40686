//! CLI enum types for style selection.

use clap::ValueEnum;

use crate::animate::Style;

/// Animation style as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StyleArg {
    #[default]
    ClassicAnime,
    #[value(name = "pixar-3d")]
    Pixar3d,
    AmericanCartoon,
    GraphicNovel,
}

impl From<StyleArg> for Style {
    fn from(s: StyleArg) -> Self {
        match s {
            StyleArg::ClassicAnime => Style::ClassicAnime,
            StyleArg::Pixar3d => Style::Pixar3d,
            StyleArg::AmericanCartoon => Style::AmericanCartoon,
            StyleArg::GraphicNovel => Style::GraphicNovel,
        }
    }
}
