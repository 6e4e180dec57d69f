pub mod event;
pub mod level;
pub mod map;
pub mod session;
pub mod step;
pub mod world;
