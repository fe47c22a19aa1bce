use thiserror::Error;

/// Errors that can occur in the dilemma library.
#[derive(Error, Debug)]
pub enum DilemmaError {
    /// A parameter or goodwill value is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A matrix or vector does not match the population size.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A choice pair reached the resolver without both choices being resolved.
    #[error("unclassifiable outcome for agent {agent} against {counterparty}")]
    UnclassifiableOutcome { agent: usize, counterparty: usize },

    /// A failure inside a single trajectory, tagged with its origin.
    #[error("parameter set {param_set}, run {run}, step {step}: {source}")]
    Run {
        param_set: usize,
        run: usize,
        step: usize,
        #[source]
        source: Box<DilemmaError>,
    },

    /// Experiment configuration is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// Reading a config file or writing results failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML config could not be parsed.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Results could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Task execution failed.
    #[error("task execution failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
