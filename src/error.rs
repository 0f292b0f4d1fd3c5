use thiserror::Error;

/// Errors surfaced by the separation pipeline.
///
/// Separation is deterministic and all-or-nothing: every variant means no
/// output was produced for the invocation.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("input signal is empty")]
    EmptySignal,

    /// Non-finite samples were detected in a separated component. The
    /// arithmetic guards in the pipeline should make this unreachable; it is
    /// checked so a bad value is reported instead of written out.
    #[error("numeric instability: non-finite samples in {component} output")]
    NumericInstability { component: &'static str },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
