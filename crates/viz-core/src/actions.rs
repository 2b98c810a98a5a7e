use super::state::RawVisualization;
use super::state::VizId;

#[derive(Debug, Clone)]
pub enum DashboardAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    PromptInput(char),
    PromptBackspace,
    PromptPaste(String),
    PromptClear,
    PromptHistoryPrev,
    PromptHistoryNext,
    /// Cycle the prompt through [`SAMPLE_QUERIES`] that match what is typed so far.
    PromptCycleSample,
    PromptSubmit,
    Submit(String),
    Select(VizId),
    SelectNext,
    SelectPrev,
    Deselect,
    Remove(VizId),
    RemoveSelected,
    CopySelected,
    ToggleInspector,
    ToggleFocus,
    DismissNotice,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    InterpretationSucceeded {
        query: String,
        spec: RawVisualization,
    },
    InterpretationFailed {
        query: String,
        message: String,
    },
    SetCollaboratorLabel(String),
    AppendLog(String),
    ClearLogs,
}

pub const SAMPLE_QUERIES: [&str; 5] = [
    "Create a pie chart representing industry breakdown",
    "Create a scatter plot of founded year and valuation",
    "Create a table to see which investors appear most frequently",
    "Give me the best representation of data if I want to understand the correlation of ARR and Valuation",
    "Change the color of the chart to light blue",
];

pub fn filtered_sample_indices(query: &str) -> Vec<usize> {
    let query = query.trim().to_ascii_lowercase();
    if query.is_empty() {
        return (0..SAMPLE_QUERIES.len()).collect();
    }

    SAMPLE_QUERIES
        .iter()
        .enumerate()
        .filter_map(|(idx, sample)| {
            if sample.to_ascii_lowercase().contains(&query) {
                Some(idx)
            } else {
                None
            }
        })
        .collect()
}
