use super::*;
use pretty_assertions::assert_eq;

#[test]
fn activity_seq_is_monotonic() {
    let mut state = state();
    run_runtime(&mut state, RuntimeAction::AppendLog("one".to_string()));
    run_runtime(&mut state, RuntimeAction::AppendLog("two".to_string()));
    run_runtime(&mut state, RuntimeAction::AppendLog("three".to_string()));

    let seqs: Vec<u64> = state.session.activity.iter().map(|entry| entry.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert!(state.session.activity.iter().all(|entry| entry.ts_ms.is_some()));
}

#[test]
fn activity_capacity_eviction_is_fifo() {
    let mut state = state();
    state.session.activity = LogBuffer::new(3);

    for value in ["1", "2", "3", "4", "5"] {
        run_runtime(&mut state, RuntimeAction::AppendLog(value.to_string()));
    }

    let seqs: Vec<u64> = state.session.activity.iter().map(|entry| entry.seq).collect();
    assert_eq!(seqs, vec![3, 4, 5]);
}

#[test]
fn clear_logs_resets_sequence_to_one() {
    let mut state = state();
    run_runtime(&mut state, RuntimeAction::AppendLog("1".to_string()));
    run_runtime(&mut state, RuntimeAction::AppendLog("2".to_string()));
    run_runtime(&mut state, RuntimeAction::ClearLogs);
    run_runtime(&mut state, RuntimeAction::AppendLog("3".to_string()));

    let seqs: Vec<u64> = state.session.activity.iter().map(|entry| entry.seq).collect();
    assert_eq!(seqs, vec![1]);
}

#[test]
fn applied_responses_are_logged_with_disposition() {
    let mut state = state();
    let a = round_trip(&mut state, "pie chart of industries", pie("A"));
    round_trip(
        &mut state,
        "make it green",
        styled("pie", "A", json!({ "color": "green" })),
    );

    let messages: Vec<String> = state
        .session
        .activity
        .iter()
        .map(|entry| entry.message.clone())
        .collect();
    assert_eq!(
        messages,
        vec![
            "> pie chart of industries".to_string(),
            format!("{a} (new) appended at position 1"),
            "> make it green".to_string(),
            format!("{a} (tweak) replaced last at position 1"),
        ]
    );
}

#[test]
fn collaborator_label_is_runtime_state() {
    let mut state = state();
    run_runtime(
        &mut state,
        RuntimeAction::SetCollaboratorLabel("simulated".to_string()),
    );
    assert_eq!(state.collaborator_label, "simulated");
}
