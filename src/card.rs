use std::path::{Path, PathBuf};

use crate::{
    canvas,
    error::CardResult,
    layout::{self, TextDimensions},
    magick::Renderer,
    model::{CardConfig, CardSpec},
    ops::{Gravity, Op, TextOp},
};

/// One card family: measures its title and assembles its operation list.
///
/// Families are independent implementations of this trait; swapping the
/// family swaps the whole visual treatment without touching the renderer.
pub trait CardType {
    fn measure_title(&self, renderer: &dyn Renderer) -> CardResult<TextDimensions>;

    fn build_operations(&self, renderer: &dyn Renderer) -> CardResult<Vec<Op>>;

    fn output_file(&self) -> &Path;

    /// Assembles the full pipeline and submits it as one renderer
    /// invocation. No output file is written when the renderer fails.
    fn build(&self, renderer: &dyn Renderer) -> CardResult<()> {
        let ops = self.build_operations(renderer)?;
        tracing::debug!(
            operations = ops.len(),
            output = %self.output_file().display(),
            "submitting card pipeline"
        );
        renderer.run_pipeline(&ops)
    }
}

/// The three stacked passes of the gearwork text treatment.
///
/// Every layer draws the identical string at the identical position; only
/// the font file and fill color differ between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontLayer {
    Main,
    Infill,
    Gears,
}

impl FontLayer {
    /// Draw order of the stack.
    pub const STACK: [FontLayer; 3] = [FontLayer::Main, FontLayer::Infill, FontLayer::Gears];
}

/// Fixed assets and colors of the gearwork card family.
///
/// The infill and gears fills currently share a value but stay separate
/// knobs; sibling families tune them independently.
#[derive(Clone, Debug)]
pub struct GearworkStyle {
    pub title_font: PathBuf,
    pub title_color: String,
    pub title_infill_font: PathBuf,
    pub title_infill_color: String,
    pub title_gears_font: PathBuf,
    pub title_gears_color: String,
    pub index_font: PathBuf,
    pub index_color: String,
    pub index_infill_font: PathBuf,
    pub index_infill_color: String,
    pub index_gears_font: PathBuf,
    pub index_gears_color: String,
    pub gradient: PathBuf,
}

impl GearworkStyle {
    /// Builds the style from a reference-asset directory laid out as
    /// `fonts/` and `overlays/` subdirectories.
    pub fn from_ref_root(root: &Path) -> Self {
        let fonts = root.join("fonts");
        Self {
            title_font: fonts.join("Gearwork-Main.otf"),
            title_color: "#FFFFFF".to_string(),
            title_infill_font: fonts.join("Gearwork-Infill.otf"),
            title_infill_color: "#000000".to_string(),
            title_gears_font: fonts.join("Gearwork-Gears.otf"),
            title_gears_color: "#000000".to_string(),
            index_font: fonts.join("Gearwork-Main.otf"),
            index_color: "#FFFFFF".to_string(),
            index_infill_font: fonts.join("Gearwork-Infill.otf"),
            index_infill_color: "#000000".to_string(),
            index_gears_font: fonts.join("Gearwork-Gears.otf"),
            index_gears_color: "#000000".to_string(),
            gradient: root.join("overlays").join("gradient.png"),
        }
    }
}

impl Default for GearworkStyle {
    fn default() -> Self {
        Self::from_ref_root(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/ref")))
    }
}

/// Title card with the stacked main/infill/gears font treatment.
pub struct GearworkCard {
    spec: CardSpec,
    style: GearworkStyle,
}

/// Point size of the index text, identical across its three layers.
const INDEX_POINT_SIZE: f64 = 60.0;

impl GearworkCard {
    pub fn new(config: CardConfig) -> CardResult<Self> {
        Self::with_style(config, GearworkStyle::default())
    }

    pub fn with_style(config: CardConfig, style: GearworkStyle) -> CardResult<Self> {
        let spec = CardSpec::resolve(config, &style)?;
        Ok(Self { spec, style })
    }

    pub fn spec(&self) -> &CardSpec {
        &self.spec
    }

    fn title_font(&self, layer: FontLayer) -> &Path {
        match layer {
            FontLayer::Main => &self.spec.font_file,
            FontLayer::Infill => &self.style.title_infill_font,
            FontLayer::Gears => &self.style.title_gears_font,
        }
    }

    fn title_fill(&self, layer: FontLayer) -> &str {
        match layer {
            FontLayer::Main => &self.spec.font_color,
            FontLayer::Infill => &self.style.title_infill_color,
            FontLayer::Gears => &self.style.title_gears_color,
        }
    }

    fn index_font(&self, layer: FontLayer) -> &Path {
        match layer {
            FontLayer::Main => &self.style.index_font,
            FontLayer::Infill => &self.style.index_infill_font,
            FontLayer::Gears => &self.style.index_gears_font,
        }
    }

    fn index_fill(&self, layer: FontLayer) -> &str {
        match layer {
            FontLayer::Main => &self.spec.episode_text_color,
            FontLayer::Infill => &self.style.index_infill_color,
            FontLayer::Gears => &self.style.index_gears_color,
        }
    }

    fn title_text_ops(&self) -> Vec<Op> {
        FontLayer::STACK
            .into_iter()
            .map(|layer| {
                Op::AnnotateText(TextOp {
                    font: self.title_font(layer).to_path_buf(),
                    gravity: Gravity::South,
                    point_size: self.spec.title_point_size,
                    kerning: 0,
                    interline_spacing: Some(self.spec.interline_spacing),
                    transparent_background: true,
                    fill: self.title_fill(layer).to_string(),
                    x_offset: 0,
                    y_offset: self.spec.title_y,
                    text: self.spec.title_text.clone(),
                })
            })
            .collect()
    }

    /// Index layers, positioned just above the measured title block.
    ///
    /// Empty when both season and episode text are hidden.
    fn index_text_ops(&self, title_dims: TextDimensions) -> Vec<Op> {
        let Some(index_text) = self.spec.index_text() else {
            return Vec::new();
        };

        let offset = layout::index_offset(self.spec.title_y, title_dims.height);
        FontLayer::STACK
            .into_iter()
            .map(|layer| {
                Op::AnnotateText(TextOp {
                    font: self.index_font(layer).to_path_buf(),
                    gravity: Gravity::South,
                    point_size: INDEX_POINT_SIZE,
                    kerning: 0,
                    interline_spacing: None,
                    transparent_background: false,
                    fill: self.index_fill(layer).to_string(),
                    x_offset: 0,
                    y_offset: offset,
                    text: index_text.clone(),
                })
            })
            .collect()
    }
}

impl CardType for GearworkCard {
    fn measure_title(&self, renderer: &dyn Renderer) -> CardResult<TextDimensions> {
        layout::title_dimensions(&self.spec, renderer)
    }

    /// Ordered pipeline: source, resize/style, gradient, index layers,
    /// title layers, mask, output resize, write.
    ///
    /// The title measurement runs first so the index offset is available,
    /// even though the index layers composite before the title layers.
    #[tracing::instrument(skip_all, fields(output = %self.spec.output_file.display()))]
    fn build_operations(&self, renderer: &dyn Renderer) -> CardResult<Vec<Op>> {
        let title_dims = self.measure_title(renderer)?;

        let mut ops = Vec::with_capacity(16);
        ops.push(Op::LoadImage(self.spec.source_file.clone()));
        ops.extend(canvas::resize_and_style(self.spec.blur, self.spec.grayscale));
        ops.push(Op::CompositeImage(self.style.gradient.clone()));
        ops.extend(self.index_text_ops(title_dims));
        ops.extend(self.title_text_ops());
        ops.extend(canvas::overlay_mask(&self.spec.source_file));
        ops.push(canvas::resize_output());
        ops.push(Op::WriteImage(self.spec.output_file.clone()));
        Ok(ops)
    }

    fn output_file(&self) -> &Path {
        &self.spec.output_file
    }
}
