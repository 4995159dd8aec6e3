//! Individual preprocessing steps, in the order the ID pipeline applies them

pub mod resize;
pub mod grayscale;
pub mod normalize;
pub mod gamma;
pub mod sharpen;
pub mod threshold;
pub mod denoise;
