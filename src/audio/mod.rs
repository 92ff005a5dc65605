//! Procedural ambient audio bed mixed into video exports.

pub mod synth;
