/// The solver could not produce any sample. Retryable with a relaxed time
/// limit or a different backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverUnavailableError {
    /// The time limit ran out before a single read completed.
    Timeout { limit_ms: u64 },
    /// The backend failed (connection refused, bad response, ...).
    Backend(String),
    /// The model exceeds what the backend can handle.
    TooLarge { num_variables: usize, max_variables: usize },
    /// The backend answered without any sample.
    EmptyResponse,
}

impl std::fmt::Display for SolverUnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverUnavailableError::Timeout { limit_ms } => {
                write!(f, "solver timed out after {} ms without a sample", limit_ms)
            }
            SolverUnavailableError::Backend(message) => write!(f, "solver backend failed: {}", message),
            SolverUnavailableError::TooLarge {
                num_variables,
                max_variables,
            } => write!(
                f,
                "model has {} variables; backend supports at most {}",
                num_variables, max_variables
            ),
            SolverUnavailableError::EmptyResponse => write!(f, "solver returned no samples"),
        }
    }
}

impl std::error::Error for SolverUnavailableError {}
