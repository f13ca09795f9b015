#![forbid(unsafe_code)]

//! Episode title-card composition driven by the ImageMagick CLI.
//!
//! The crate computes text layout offsets, assembles an ordered drawing
//! pipeline, and submits it to the system `magick` binary in a single
//! invocation. All rasterization stays in the external renderer.

pub mod canvas;
pub mod card;
pub mod error;
pub mod layout;
pub mod magick;
pub mod model;
pub mod ops;

pub use card::{CardType, FontLayer, GearworkCard, GearworkStyle};
pub use error::{CardError, CardResult};
pub use layout::TextDimensions;
pub use magick::{MagickRenderer, MeasureRequest, Renderer, is_magick_on_path};
pub use model::{CardConfig, CardSpec, INDEX_TEXT_SEPARATOR};
pub use ops::{Gravity, Op, TextOp, pipeline_args};
