pub mod physics;
pub mod time;
