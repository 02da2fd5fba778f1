pub mod keymap;

pub use keymap::{Action, map_key, map_scroll};
