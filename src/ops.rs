use std::path::PathBuf;

/// Anchor point for text placement, in the renderer's gravity vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gravity {
    Center,
    North,
    NorthEast,
    NorthWest,
    South,
    SouthEast,
    SouthWest,
    East,
    West,
}

impl Gravity {
    pub fn as_str(self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::North => "north",
            Gravity::NorthEast => "northeast",
            Gravity::NorthWest => "northwest",
            Gravity::South => "south",
            Gravity::SouthEast => "southeast",
            Gravity::SouthWest => "southwest",
            Gravity::East => "east",
            Gravity::West => "west",
        }
    }
}

/// A single text annotation pass.
///
/// The text must already be escaped for the renderer's annotate syntax;
/// escaping happens once when the card spec is resolved, never here.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub font: PathBuf,
    pub gravity: Gravity,
    pub point_size: f64,
    pub kerning: i32,
    pub interline_spacing: Option<i32>,
    pub transparent_background: bool,
    pub fill: String,
    pub x_offset: i32,
    pub y_offset: i32,
    pub text: String,
}

/// One drawing operation in a card pipeline.
///
/// Operations composite in list order; each renders itself into the argv
/// fragment the `magick` binary expects.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    LoadImage(PathBuf),
    /// Scale to fill the given box, preserving aspect ratio.
    ResizeFill { width: u32, height: u32 },
    /// Crop/pad the canvas to exactly the given box.
    Extent { width: u32, height: u32 },
    Blur { radius: u32, sigma: u32 },
    Grayscale,
    CompositeImage(PathBuf),
    AnnotateText(TextOp),
    ApplyMask(PathBuf),
    ResizeOutput { width: u32, height: u32 },
    WriteImage(PathBuf),
}

impl Op {
    pub fn push_args(&self, args: &mut Vec<String>) {
        match self {
            Op::LoadImage(path) => args.push(path.to_string_lossy().into_owned()),
            Op::ResizeFill { width, height } => {
                args.push("-resize".into());
                args.push(format!("{width}x{height}^"));
            }
            Op::Extent { width, height } => {
                args.push("-extent".into());
                args.push(format!("{width}x{height}"));
            }
            Op::Blur { radius, sigma } => {
                args.push("-blur".into());
                args.push(format!("{radius}x{sigma}"));
            }
            Op::Grayscale => {
                args.push("-colorspace".into());
                args.push("gray".into());
            }
            Op::CompositeImage(path) | Op::ApplyMask(path) => {
                args.push(path.to_string_lossy().into_owned());
                args.push("-composite".into());
            }
            Op::AnnotateText(op) => {
                args.push("-font".into());
                args.push(op.font.to_string_lossy().into_owned());
                args.push("-gravity".into());
                args.push(op.gravity.as_str().into());
                args.push("-pointsize".into());
                args.push(op.point_size.to_string());
                args.push("-kerning".into());
                args.push(op.kerning.to_string());
                if let Some(spacing) = op.interline_spacing {
                    args.push("-interline-spacing".into());
                    args.push(spacing.to_string());
                }
                if op.transparent_background {
                    args.push("-background".into());
                    args.push("transparent".into());
                }
                args.push("-fill".into());
                args.push(op.fill.clone());
                args.push("-annotate".into());
                args.push(format!("{:+}{:+}", op.x_offset, op.y_offset));
                args.push(op.text.clone());
            }
            Op::ResizeOutput { width, height } => {
                args.push("-resize".into());
                args.push(format!("{width}x{height}"));
            }
            Op::WriteImage(path) => args.push(path.to_string_lossy().into_owned()),
        }
    }
}

/// Renders a full op list into the argv passed to the renderer binary.
pub fn pipeline_args(ops: &[Op]) -> Vec<String> {
    let mut args = Vec::new();
    for op in ops {
        op.push_args(&mut args);
    }
    args
}
