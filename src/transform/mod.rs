//! Image transformation
//!
//! Removing the info bar from a decoded image and handing the result to the
//! configured scale encoder.

mod crop;

pub use crop::{crop_info_bar, ImageTransformer};
