pub mod actions;
pub mod canvas;
pub mod display;
pub mod input;
pub mod setup;

pub use actions::{handle_commands, load_saved_document, poll_exports, PendingExports};
pub use canvas::{redraw_canvas, resize_canvas};
pub use display::sync_window_settings;
pub use input::{canvas_pointer, keyboard_shortcuts};
pub use setup::setup;
