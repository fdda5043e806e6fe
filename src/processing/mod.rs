pub mod downsampling;
pub mod nearest;
