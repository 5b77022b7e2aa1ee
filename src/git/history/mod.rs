pub mod diff;
pub mod walker;
