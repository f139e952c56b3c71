pub mod block;
pub mod debug;
pub mod editor;
pub mod grid;
pub mod interaction;
pub mod persistence;
pub mod raster;
pub mod render;
pub mod ron;
pub use crate::ron as ron_loader;
pub mod settings;
pub mod ui;
