//! Utility functions for formatting and id generation.

pub mod format;

pub use format::{format_bytes, format_coordinates, generate_id, truncate_string};
