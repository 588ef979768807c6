//! CLI module for ollamactl
//!
//! Handles command-line argument parsing and terminal presentation.

pub mod args;
pub mod display;

pub use args::{Args, Commands, Verbosity};
