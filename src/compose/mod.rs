//! Frame composition: phase routines that turn reel data into a display list.

pub mod compositor;
pub mod icons;
pub mod palette;
pub mod particles;
pub mod phases;
pub mod scene;
pub mod text;
