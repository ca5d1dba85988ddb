//! Shared utilities used by the proxy, the direct client and the UI model.

pub mod format;

pub use format::{format_duration, format_size, status_text};
