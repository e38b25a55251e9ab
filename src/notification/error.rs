//! Error types for digest rendering.

use thiserror::Error;

use crate::notification::template::TemplateServiceError;

/// Defines the possible errors that can occur while rendering a digest.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer was handed no alerts.
    #[error("Cannot render a digest without alerts")]
    EmptyBatch,

    /// A template failed to render.
    #[error("Template rendering error: {0}")]
    Template(#[from] TemplateServiceError),
}
