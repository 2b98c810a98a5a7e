use viz_core::Applied;
use viz_core::SessionError;
use viz_core::SessionState;

use crate::contracts::InterpretRequest;
use crate::error::SubmitError;
use crate::interpreter::Interpreter;

/// Runs one blocking round trip: hint, collaborator, apply.
///
/// A failed round trip leaves `session` exactly as it was.
pub fn submit(
    session: &mut SessionState,
    interpreter: &dyn Interpreter,
    query: &str,
) -> Result<Applied, SubmitError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SessionError::EmptyQuery.into());
    }
    if session.is_busy() {
        return Err(SessionError::Busy.into());
    }

    let request = InterpretRequest::for_session(session, query);
    let hint = request.current_viz.as_ref().map(|viz| viz.id());
    tracing::debug!(query = %query, hint = ?hint, collaborator = interpreter.name(), "submitting");

    let raw = interpreter.interpret(&request).map_err(|err| {
        tracing::warn!(query = %query, error = %err, "interpretation failed");
        err
    })?;
    let applied = session.apply_response(query, raw);
    tracing::info!(
        id = %applied.id,
        position = applied.position,
        disposition = applied.disposition.label(),
        outcome = applied.outcome.label(),
        "applied collaborator response"
    );
    Ok(applied)
}
