pub mod executive;
pub mod frontend;
pub mod solution;
