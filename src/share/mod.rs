//! Share flow: preview playback, export recording and handing the result to the user.

pub mod delivery;
pub mod session;
