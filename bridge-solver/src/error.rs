/// Failure modes of the solver collaborator's command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    /// A card passed to `play` was not a legal continuation of the replay.
    IllegalReplay,
    /// `tricks_for` was asked to score a move while a trick was still open
    /// from a prior partial replay that never reached a boundary.
    NotAtTrickBoundary,
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::IllegalReplay => write!(f, "illegal card in solver replay"),
            SolverError::NotAtTrickBoundary => write!(f, "query issued away from a trick boundary"),
        }
    }
}

impl std::error::Error for SolverError {}
