pub mod board;
pub mod config;
pub mod document;
pub mod error;
pub mod log;
pub mod storage;

// Decoupled game loop architecture
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use board::{Board, Intent};
pub use document::Document;
pub use error::{Error, Result};
pub use storage::BoardStore;
