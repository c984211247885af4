pub mod formatter;

pub use formatter::{humanize_duration, print_json, RenderMode};
