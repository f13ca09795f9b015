use std::{cell::OnceCell, path::PathBuf};

use crate::{
    card::GearworkStyle,
    error::{CardError, CardResult},
    layout::{self, TextDimensions},
    magick,
};

/// Separator between season and episode text when both are visible.
pub const INDEX_TEXT_SEPARATOR: &str = " \u{2022} ";

/// Raw card request as it arrives from a batch file or the CLI.
///
/// Optional fields fall back to the card family's style defaults when the
/// config is resolved into a [`CardSpec`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CardConfig {
    pub source_file: PathBuf,
    pub output_file: PathBuf,
    pub title_text: String,
    #[serde(default)]
    pub season_text: String,
    #[serde(default)]
    pub episode_text: String,
    #[serde(default)]
    pub hide_season_text: bool,
    #[serde(default)]
    pub hide_episode_text: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_interline_spacing: i32,
    #[serde(default)]
    pub font_vertical_shift: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_text_color: Option<String>,
    #[serde(default)]
    pub blur: bool,
    #[serde(default)]
    pub grayscale: bool,
}

fn default_font_size() -> f64 {
    1.0
}

/// Fully resolved configuration for one card build.
///
/// Text fields are escaped for the renderer's annotate syntax exactly once,
/// here; derived scalars are fixed at construction. The only state that
/// changes afterwards is the memoized title measurement.
#[derive(Clone, Debug)]
pub struct CardSpec {
    pub source_file: PathBuf,
    pub output_file: PathBuf,
    pub title_text: String,
    pub season_text: String,
    pub episode_text: String,
    pub hide_season_text: bool,
    pub hide_episode_text: bool,
    /// Newline-separated segments of the raw title, fixed at construction
    /// and used only for measurement.
    pub line_count: usize,
    pub font_file: PathBuf,
    pub font_color: String,
    pub title_point_size: f64,
    pub interline_spacing: i32,
    pub title_y: i32,
    pub episode_text_color: String,
    pub blur: bool,
    pub grayscale: bool,
    title_dimensions: OnceCell<TextDimensions>,
}

/// Point size of the title text before the user's size multiplier.
const TITLE_BASE_POINT_SIZE: f64 = 256.0;

impl CardSpec {
    pub fn resolve(config: CardConfig, style: &GearworkStyle) -> CardResult<Self> {
        if !config.font_size.is_finite() || config.font_size <= 0.0 {
            return Err(CardError::input(format!(
                "font size must be positive, got {}",
                config.font_size
            )));
        }
        if config.title_text.is_empty() {
            return Err(CardError::input("title text must not be empty"));
        }

        Ok(Self {
            source_file: config.source_file,
            output_file: config.output_file,
            title_text: magick::escape_chars(&config.title_text),
            season_text: magick::escape_chars(&config.season_text),
            episode_text: magick::escape_chars(&config.episode_text),
            hide_season_text: config.hide_season_text,
            hide_episode_text: config.hide_episode_text,
            line_count: config.title_text.split('\n').count(),
            font_file: config.font_file.unwrap_or_else(|| style.title_font.clone()),
            font_color: config
                .font_color
                .unwrap_or_else(|| style.title_color.clone()),
            title_point_size: TITLE_BASE_POINT_SIZE * config.font_size,
            interline_spacing: layout::interline_spacing(config.font_interline_spacing),
            title_y: layout::title_y(config.font_vertical_shift),
            episode_text_color: config
                .episode_text_color
                .unwrap_or_else(|| style.index_color.clone()),
            blur: config.blur,
            grayscale: config.grayscale,
            title_dimensions: OnceCell::new(),
        })
    }

    /// Resolves the index text string, or `None` when nothing is drawn.
    pub fn index_text(&self) -> Option<String> {
        match (self.hide_season_text, self.hide_episode_text) {
            (true, true) => None,
            (true, false) => Some(self.episode_text.clone()),
            (false, true) => Some(self.season_text.clone()),
            (false, false) => Some(format!(
                "{}{INDEX_TEXT_SEPARATOR}{}",
                self.season_text, self.episode_text
            )),
        }
    }

    pub fn cached_title_dimensions(&self) -> Option<TextDimensions> {
        self.title_dimensions.get().copied()
    }

    pub fn cache_title_dimensions(&self, dims: TextDimensions) -> TextDimensions {
        *self.title_dimensions.get_or_init(|| dims)
    }
}
