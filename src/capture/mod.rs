//! Exporting rendered playback: video through `ffmpeg`, animated images through a lazily loaded
//! encoder.

pub mod codec;
pub mod gif;
pub mod sink;
pub mod video;
