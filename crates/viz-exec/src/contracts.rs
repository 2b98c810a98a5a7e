use serde::Deserialize;
use serde::Serialize;
use viz_core::Row;
use viz_core::SessionState;
use viz_core::VisualizationSpec;

/// Body of `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretRequest {
    pub query: String,
    pub current_viz: Option<VisualizationSpec>,
}

impl InterpretRequest {
    pub fn new(query: impl Into<String>, current_viz: Option<VisualizationSpec>) -> Self {
        Self {
            query: query.into(),
            current_viz,
        }
    }

    /// Uses the session's target hint as the visualization under discussion.
    pub fn for_session(session: &SessionState, query: impl Into<String>) -> Self {
        Self::new(query, session.target_hint().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub dataset_loaded: bool,
    #[serde(default)]
    pub rows: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetShape {
    pub rows: u64,
    pub columns: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub shape: DatasetShape,
    #[serde(default)]
    pub sample: Vec<Row>,
}

/// Error payload the collaborator sends with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
