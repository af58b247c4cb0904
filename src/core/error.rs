use thiserror::Error;

/// Errors that can occur while building, serializing, or signing documents.
///
/// Validators never return this type. Malformed input to a validator ends up
/// as an error string inside a [`ValidationResult`](super::ValidationResult).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// A signer failed to produce a signature.
    #[error("signing error: {0}")]
    Signing(String),

    /// Scannable-code or image encoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// PDF rendering failed.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// JSON mapping failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// Generated artifacts disagree on a figure they all carry.
    #[error("reconciliation error: {0}")]
    Reconciliation(String),

    /// One stage of document generation failed; no artifacts were produced.
    #[error("generation failed at {stage}: {source}")]
    Generation {
        /// Stage that failed (e.g. "scannable-code", "xml-signature").
        stage: &'static str,
        /// Underlying cause.
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Wrap a stage failure into the single generation-failed outcome.
    pub fn generation(stage: &'static str, source: EngineError) -> Self {
        match source {
            // Never nest generation failures.
            already @ EngineError::Generation { .. } => already,
            other => EngineError::Generation {
                stage,
                source: Box::new(other),
            },
        }
    }
}
