use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use viz_core::RawVisualization;
use viz_core::RuntimeAction;
use viz_core::VisualizationSpec;

use crate::contracts::InterpretRequest;
use crate::error::InterpretError;
use crate::interpreter::Interpreter;

/// Runs one interpretation on a worker thread and reports back as a [`RuntimeAction`].
///
/// A closed channel means the front end has exited; the result is dropped.
pub fn spawn_interpretation(
    interpreter: Arc<dyn Interpreter>,
    query: String,
    current_viz: Option<VisualizationSpec>,
    tx: Sender<RuntimeAction>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let request = InterpretRequest::new(query, current_viz);
        let result = interpreter.interpret(&request);
        let _ = tx.send(completion(request.query, result));
    })
}

pub fn completion(
    query: String,
    result: Result<RawVisualization, InterpretError>,
) -> RuntimeAction {
    match result {
        Ok(spec) => RuntimeAction::InterpretationSucceeded { query, spec },
        Err(err) => {
            tracing::warn!(query = %query, error = %err, "interpretation failed");
            RuntimeAction::InterpretationFailed {
                query,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use viz_core::ChartKind;

    use super::*;
    use crate::simulated::SimulatedInterpreter;

    #[test]
    fn worker_reports_success_over_channel() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_interpretation(
            Arc::new(SimulatedInterpreter::new()),
            "pie chart of industry breakdown".to_string(),
            None,
            tx,
        );
        handle.join().expect("worker");

        match rx.recv_timeout(Duration::from_secs(1)).expect("completion") {
            RuntimeAction::InterpretationSucceeded { query, spec } => {
                assert_eq!(query, "pie chart of industry breakdown");
                assert_eq!(spec.kind, ChartKind::Pie);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn failures_carry_display_message() {
        let action = completion(
            "bar chart".to_string(),
            Err(InterpretError::Status {
                code: 500,
                message: "Dataset not loaded".to_string(),
            }),
        );
        match action {
            RuntimeAction::InterpretationFailed { query, message } => {
                assert_eq!(query, "bar chart");
                assert_eq!(message, "collaborator returned 500: Dataset not loaded");
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn closed_channel_is_not_an_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let handle = spawn_interpretation(
            Arc::new(SimulatedInterpreter::new()),
            "bar chart".to_string(),
            None,
            tx,
        );
        assert!(handle.join().is_ok());
    }
}
