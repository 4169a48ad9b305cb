pub type SynthResult<T> = Result<T, SynthError>;

#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// A registration carried a kind string outside the closed set.
    /// The registry is left untouched.
    #[error("unknown transform kind '{0}'")]
    UnknownKind(String),

    /// An input had neither a supplied value nor a declared default.
    /// Aborts the whole compile.
    #[error("transform '{transform}' is missing argument '{input}' and no default is declared")]
    MissingArgument { transform: String, input: String },

    /// A nested pipeline was supplied where only a literal or dynamic
    /// value is legal. Aborts the whole compile.
    #[error("transform '{transform}' input '{input}' cannot take a nested pipeline")]
    InvalidArgumentPosition { transform: String, input: String },

    /// Pipeline construction violated the chain invariant.
    #[error("chain error: {0}")]
    Chain(String),

    /// A transform name referenced by a pipeline is not in the compile's
    /// registry snapshot. The registry has no removal operation, so this
    /// only occurs for pipelines built against a different registry.
    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SynthError {
    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    pub fn missing_argument(transform: impl Into<String>, input: impl Into<String>) -> Self {
        Self::MissingArgument {
            transform: transform.into(),
            input: input.into(),
        }
    }

    pub fn invalid_argument_position(
        transform: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self::InvalidArgumentPosition {
            transform: transform.into(),
            input: input.into(),
        }
    }
}
