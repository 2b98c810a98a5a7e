use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;

pub(super) use super::reduce;
pub(super) use super::VizEffect;
pub(super) use crate::actions::DashboardAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::classifier::Disposition;
pub(super) use crate::state::ChartKind;
pub(super) use crate::state::DashboardState;
pub(super) use crate::state::ErrorKind;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::RawVisualization;
pub(super) use crate::state::SessionState;
pub(super) use crate::state::StyleDescriptor;
pub(super) use crate::state::VizId;

mod activity_log;

fn state() -> DashboardState {
    DashboardState::new(SessionState::new())
}

fn raw(value: Value) -> RawVisualization {
    serde_json::from_value(value).expect("decode raw visualization")
}

fn pie(title: &str) -> RawVisualization {
    raw(json!({
        "type": "pie",
        "title": title,
        "data": [{ "name": "Fintech", "value": 3 }, { "name": "Security", "value": 2 }],
        "styling": { "color": "#8884d8" }
    }))
}

fn bar(title: &str) -> RawVisualization {
    raw(json!({
        "type": "bar",
        "title": title,
        "data": [{ "name": "Fintech", "value": 3 }],
        "styling": { "color": "#8884d8" }
    }))
}

fn styled(kind: &str, title: &str, styling: Value) -> RawVisualization {
    raw(json!({ "type": kind, "title": title, "styling": styling }))
}

fn user(state: &mut DashboardState, action: UserAction) -> Vec<VizEffect> {
    reduce(state, DashboardAction::User(action))
}

fn run_runtime(state: &mut DashboardState, action: RuntimeAction) {
    let effects = reduce(state, DashboardAction::Runtime(action));
    assert!(effects.is_empty());
}

/// Submits `query`, checks the interpret effect, then completes it with `response`.
fn round_trip(state: &mut DashboardState, query: &str, response: RawVisualization) -> VizId {
    let effects = user(state, UserAction::Submit(query.to_string()));
    assert!(
        matches!(effects.first(), Some(VizEffect::Interpret { .. })),
        "expected interpret effect, got {effects:?}"
    );
    assert!(state.session.is_busy());

    run_runtime(
        state,
        RuntimeAction::InterpretationSucceeded {
            query: query.to_string(),
            spec: response,
        },
    );
    assert!(!state.session.is_busy());
    state
        .session
        .last_applied
        .map(|applied| applied.id)
        .expect("response applied")
}

fn ids(state: &DashboardState) -> Vec<VizId> {
    state
        .session
        .visualizations()
        .iter()
        .map(|viz| viz.id())
        .collect()
}

fn titles(state: &DashboardState) -> Vec<String> {
    state
        .session
        .visualizations()
        .iter()
        .map(|viz| viz.title.clone())
        .collect()
}

fn assert_titles(state: &DashboardState, expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    assert_eq!(titles(state), expected);
}
