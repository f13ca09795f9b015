use crate::{
    error::CardResult,
    magick::{MeasureRequest, Renderer},
    model::CardSpec,
};

/// Measured size of a rendered text block, in renderer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextDimensions {
    pub width: u32,
    pub height: u32,
}

/// Distance of the title baseline above the bottom edge of the canvas.
pub const TITLE_BOTTOM_OFFSET: i32 = 47;

/// Correction for the title font family's excess default line gap.
pub const INTERLINE_COMPENSATION: i32 = -50;

/// How far the index text is pulled down into the title block's top edge.
const INDEX_TEXT_PULL: i32 = 10;

pub fn title_y(vertical_shift: i32) -> i32 {
    TITLE_BOTTOM_OFFSET + vertical_shift
}

pub fn interline_spacing(user_spacing: i32) -> i32 {
    INTERLINE_COMPENSATION + user_spacing
}

/// Offset of the index text above the bottom edge, sitting just above the
/// title block.
pub fn index_offset(title_y: i32, title_height: u32) -> i32 {
    title_y + title_height as i32 - INDEX_TEXT_PULL
}

/// Measures the title text, at most once per spec instance.
///
/// The first call hits the renderer's measurement capability; the result is
/// cached on the spec and returned for every later call.
pub fn title_dimensions(spec: &CardSpec, renderer: &dyn Renderer) -> CardResult<TextDimensions> {
    if let Some(dims) = spec.cached_title_dimensions() {
        return Ok(dims);
    }

    let dims = renderer.measure_text(&MeasureRequest {
        font_file: &spec.font_file,
        point_size: spec.title_point_size,
        interline_spacing: spec.interline_spacing,
        line_count: spec.line_count,
        text: &spec.title_text,
    })?;

    Ok(spec.cache_title_dimensions(dims))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_y_applies_vertical_shift() {
        assert_eq!(title_y(0), 47);
        assert_eq!(title_y(5), 52);
        assert_eq!(title_y(-50), -3);
    }

    #[test]
    fn interline_spacing_compensates_line_gap() {
        assert_eq!(interline_spacing(0), -50);
        assert_eq!(interline_spacing(10), -40);
        assert_eq!(interline_spacing(75), 25);
    }

    #[test]
    fn index_offset_sits_above_title_block() {
        assert_eq!(index_offset(52, 100), 142);
        assert_eq!(index_offset(47, 0), 37);
    }
}
