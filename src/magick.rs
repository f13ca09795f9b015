use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    error::{CardError, CardResult},
    layout::TextDimensions,
    ops::{Op, pipeline_args},
};

/// One text-measurement request against the external renderer.
#[derive(Clone, Copy, Debug)]
pub struct MeasureRequest<'a> {
    pub font_file: &'a Path,
    pub point_size: f64,
    pub interline_spacing: i32,
    pub line_count: usize,
    pub text: &'a str,
}

/// The external rendering capabilities a card build consumes.
pub trait Renderer {
    fn measure_text(&self, request: &MeasureRequest<'_>) -> CardResult<TextDimensions>;

    /// Executes one ordered operation pipeline. Operations composite in
    /// list order; the renderer writes no partial output on failure.
    fn run_pipeline(&self, ops: &[Op]) -> CardResult<()>;
}

pub const DEFAULT_MAGICK_BIN: &str = "magick";

pub fn is_magick_on_path() -> bool {
    Command::new(DEFAULT_MAGICK_BIN)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> CardResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Escapes the characters the renderer's annotate syntax treats specially.
///
/// Must run exactly once per text field; the card spec applies it at
/// construction so layer passes can embed the result verbatim.
pub fn escape_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str(r"\\"),
            '"' => out.push_str("\\\""),
            '`' => out.push_str("\\`"),
            '%' => out.push_str(r"\%"),
            _ => out.push(ch),
        }
    }
    out
}

/// Drives the system ImageMagick binary.
///
/// The binary is invoked once per pipeline; measurement runs a separate
/// annotate pass against a blank canvas and reads the metrics diagnostics.
#[derive(Clone, Debug)]
pub struct MagickRenderer {
    binary: PathBuf,
}

impl Default for MagickRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MagickRenderer {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_MAGICK_BIN),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> CardResult<std::process::Output> {
        tracing::debug!(binary = %self.binary.display(), ?args, "invoking renderer");
        Command::new(&self.binary).args(args).output().map_err(|e| {
            CardError::render(format!(
                "failed to spawn '{}' (is ImageMagick installed and on PATH?): {e}",
                self.binary.display()
            ))
        })
    }
}

impl Renderer for MagickRenderer {
    fn measure_text(&self, request: &MeasureRequest<'_>) -> CardResult<TextDimensions> {
        let args = vec![
            "-debug".to_string(),
            "annotate".to_string(),
            "xc:".to_string(),
            "-font".to_string(),
            request.font_file.to_string_lossy().into_owned(),
            "-gravity".to_string(),
            "south".to_string(),
            "-pointsize".to_string(),
            request.point_size.to_string(),
            "-interline-spacing".to_string(),
            request.interline_spacing.to_string(),
            "-annotate".to_string(),
            "+0+0".to_string(),
            request.text.to_string(),
            "null:".to_string(),
        ];

        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(CardError::render(format!(
                "text measurement exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // The annotate diagnostics land on stderr.
        let diagnostics = String::from_utf8_lossy(&output.stderr);
        parse_metrics(&diagnostics, request.interline_spacing, request.line_count).ok_or_else(
            || {
                CardError::configuration(format!(
                    "text measurement produced no metrics for font '{}' (missing or unreadable font file?)",
                    request.font_file.display()
                ))
            },
        )
    }

    fn run_pipeline(&self, ops: &[Op]) -> CardResult<()> {
        for op in ops {
            if let Op::WriteImage(path) = op {
                ensure_parent_dir(path)?;
            }
        }

        let args = pipeline_args(ops);
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(CardError::render(format!(
                "magick exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

static METRICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Metrics:.*?width:\s*([0-9.]+).*?height:\s*([0-9.]+)")
        .expect("metrics pattern is valid")
});

/// Extracts text dimensions from the renderer's annotate diagnostics.
///
/// Width is the widest reported line; height is the sum of per-line heights
/// adjusted by the interline spacing across the given line count.
fn parse_metrics(
    diagnostics: &str,
    interline_spacing: i32,
    line_count: usize,
) -> Option<TextDimensions> {
    let mut max_width = 0f64;
    let mut height_sum = 0f64;
    let mut matched = false;

    for caps in METRICS_RE.captures_iter(diagnostics) {
        let width: f64 = caps[1].parse().ok()?;
        let height: f64 = caps[2].parse().ok()?;
        max_width = max_width.max(width);
        height_sum += height;
        matched = true;
    }

    if !matched {
        return None;
    }

    let height = height_sum + f64::from(interline_spacing) * line_count as f64;
    Some(TextDimensions {
        width: max_width.round().max(0.0) as u32,
        height: height.round().max(0.0) as u32,
    })
}
