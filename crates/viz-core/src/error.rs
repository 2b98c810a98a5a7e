use thiserror::Error;

use super::state::VizId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no visualization with id {0}")]
    UnknownVisualization(VizId),

    #[error("a request is already in flight")]
    Busy,

    #[error("query is empty")]
    EmptyQuery,
}
