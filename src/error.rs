// src/error.rs
use core::fmt;

/// Library-wide error for gk-quantiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantileError {
    /// A caller-supplied parameter is outside its documented domain.
    /// `context` pinpoints which one (e.g., "eps must lie in [0, 1)").
    InvalidArgument { context: &'static str },

    /// The raw-entry buffer was pushed past capacity without a drain.
    /// Unreachable while a `Stream` drives the buffer; reported defensively.
    BufferFull { max_size: usize },

    /// An operation was issued in the wrong stream lifecycle state
    /// (e.g., push after finalize, quantile query before finalize).
    InvalidState { context: &'static str },
}

impl fmt::Display for QuantileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantileError::InvalidArgument { context } => {
                write!(f, "quantiles: invalid argument ({})", context)
            }
            QuantileError::BufferFull { max_size } => write!(
                f,
                "quantiles: buffer already full (capacity {}). \
hint: drain with generate_entry_list before pushing more",
                max_size
            ),
            QuantileError::InvalidState { context } => {
                write!(
                    f,
                    "quantiles: invalid operation for current state ({})",
                    context
                )
            }
        }
    }
}

impl std::error::Error for QuantileError {}

pub type QuantileResult<T> = Result<T, QuantileError>;
