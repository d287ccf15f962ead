//! Draw-command generation and macroquad drawing.

pub mod draw;

pub use draw::{draw_commands, draw_map, for_each_visible_tile};
