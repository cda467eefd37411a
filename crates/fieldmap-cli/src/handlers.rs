//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod apply;
mod benchmark;
mod check;
mod completions;
mod config;
mod matrix;
mod recommend;
mod transform;
mod utils;
mod validate;

#[cfg(test)]
mod test_support;

pub use apply::handle_apply;
pub use benchmark::handle_benchmark;
pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use matrix::{handle_matrix, handle_transformations};
pub use recommend::handle_recommend;
pub use transform::handle_transform;
pub use validate::handle_validate;
