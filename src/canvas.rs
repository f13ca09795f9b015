//! Canvas preparation and finishing: source resize/styling, the optional
//! mask overlay, and the output resize.

use std::path::{Path, PathBuf};

use crate::ops::Op;

/// Working and output canvas size for title cards.
pub const CARD_WIDTH: u32 = 3200;
pub const CARD_HEIGHT: u32 = 1800;

/// Blur geometry applied when a card is styled as blurred.
const BLUR_RADIUS: u32 = 0;
const BLUR_SIGMA: u32 = 60;

/// Scales the source to fill the card canvas, fixes the extent, and applies
/// any requested style treatments.
pub fn resize_and_style(blur: bool, grayscale: bool) -> Vec<Op> {
    let mut ops = vec![
        Op::ResizeFill {
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
        },
        Op::Extent {
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
        },
    ];
    if blur {
        ops.push(Op::Blur {
            radius: BLUR_RADIUS,
            sigma: BLUR_SIGMA,
        });
    }
    if grayscale {
        ops.push(Op::Grayscale);
    }
    ops
}

/// Composites the source's companion mask over everything drawn so far,
/// when one exists.
///
/// A mask is a sibling of the source image named `<stem>-mask.png`.
pub fn overlay_mask(source_file: &Path) -> Vec<Op> {
    match mask_path(source_file) {
        Some(mask) if mask.exists() => vec![Op::ApplyMask(mask)],
        _ => Vec::new(),
    }
}

fn mask_path(source_file: &Path) -> Option<PathBuf> {
    let stem = source_file.file_stem()?.to_string_lossy();
    Some(source_file.with_file_name(format!("{stem}-mask.png")))
}

pub fn resize_output() -> Op {
    Op::ResizeOutput {
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
    }
}
