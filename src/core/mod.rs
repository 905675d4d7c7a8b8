pub mod config;
pub mod error;
pub mod executive;
pub mod lifecycle;
pub mod process;
pub mod solution;
pub mod terminal;
