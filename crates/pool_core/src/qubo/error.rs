use crate::model::RequestId;

/// Bad weights, capacities or batch inputs. Must be fixed before building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidConfigError {
    message: String,
}

impl InvalidConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl std::error::Error for InvalidConfigError {}

/// One or more requests have no feasible (vehicle, slot) candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCandidateSetError {
    requests: Vec<RequestId>,
}

impl EmptyCandidateSetError {
    pub fn new(requests: Vec<RequestId>) -> Self {
        Self { requests }
    }

    /// The unservable requests, in input order.
    pub fn requests(&self) -> &[RequestId] {
        &self.requests
    }
}

impl std::fmt::Display for EmptyCandidateSetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids = self
            .requests
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "no feasible vehicle candidate for request(s) {}", ids)
    }
}

impl std::error::Error for EmptyCandidateSetError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    InvalidConfig(InvalidConfigError),
    EmptyCandidateSet(EmptyCandidateSetError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::InvalidConfig(err) => write!(f, "{}", err),
            BuildError::EmptyCandidateSet(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidConfig(err) => Some(err),
            BuildError::EmptyCandidateSet(err) => Some(err),
        }
    }
}

impl From<InvalidConfigError> for BuildError {
    fn from(err: InvalidConfigError) -> Self {
        BuildError::InvalidConfig(err)
    }
}

impl From<EmptyCandidateSetError> for BuildError {
    fn from(err: EmptyCandidateSetError) -> Self {
        BuildError::EmptyCandidateSet(err)
    }
}
