//! CLI Interface: arguments, key polling and terminal rendering
//!
//! # Components
//! - `args.rs`: Command-line options (clap)
//! - `input.rs`: Keystroke polling using crossterm
//! - `display.rs`: Terminal rendering

pub mod args;
pub mod display;
pub mod input;

pub use args::Args;
pub use display::Display;
pub use input::InputHandler;
