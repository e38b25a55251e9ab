//! Subcommands of the `alert-digest` binary other than `run`.

pub mod render;

pub use render::RenderArgs;
