use super::actions::filtered_sample_indices;
use super::actions::DashboardAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::actions::SAMPLE_QUERIES;
use super::classifier::classify;
use super::state::ChartKind;
use super::state::DashboardState;
use super::state::ErrorKind;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::Notice;
use super::state::PendingSubmission;
use super::state::VisualizationSpec;
use super::state::VizId;

#[derive(Debug, Clone, PartialEq)]
pub enum VizEffect {
    RequestFrame,
    /// Ask the collaborator to interpret `query` with `current_viz` as context.
    Interpret {
        query: String,
        current_viz: Option<VisualizationSpec>,
    },
    CopyToClipboard(String),
}

pub const PROMPT_COMMANDS: &[&str] = &[
    "/select <id>",
    "/deselect",
    "/delete <id>",
    "/clearlog",
    "/help",
];

pub fn reduce(state: &mut DashboardState, action: DashboardAction) -> Vec<VizEffect> {
    match action {
        DashboardAction::User(user) => reduce_user(state, user),
        DashboardAction::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            Vec::new()
        }
    }
}

fn reduce_user(state: &mut DashboardState, action: UserAction) -> Vec<VizEffect> {
    match action {
        UserAction::PromptInput(c) => {
            state.prompt.input.push(c);
            state.prompt.reset_navigation();
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptBackspace => {
            state.prompt.input.pop();
            state.prompt.reset_navigation();
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptPaste(text) => {
            let single_line = text.replace(['\r', '\n'], " ");
            state.prompt.input.push_str(&single_line);
            state.prompt.reset_navigation();
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptClear => {
            state.prompt.input.clear();
            state.prompt.reset_navigation();
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptHistoryPrev => {
            let history = &state.prompt.history;
            if history.is_empty() {
                return Vec::new();
            }
            let next_index = match state.prompt.history_index {
                None => history.len() - 1,
                Some(index) => index.saturating_sub(1),
            };
            state.prompt.input = history[next_index].clone();
            state.prompt.history_index = Some(next_index);
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptHistoryNext => {
            let Some(index) = state.prompt.history_index else {
                return Vec::new();
            };
            if index + 1 >= state.prompt.history.len() {
                state.prompt.history_index = None;
                state.prompt.input.clear();
            } else {
                state.prompt.history_index = Some(index + 1);
                state.prompt.input = state.prompt.history[index + 1].clone();
            }
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptCycleSample => {
            if state.prompt.sample_filter.is_none() {
                state.prompt.sample_filter = Some(state.prompt.input.clone());
            }
            let filter = state.prompt.sample_filter.clone().unwrap_or_default();
            let matches = filtered_sample_indices(&filter);
            if matches.is_empty() {
                return Vec::new();
            }
            let pick = matches[state.prompt.sample_cursor % matches.len()];
            state.prompt.input = SAMPLE_QUERIES[pick].to_string();
            state.prompt.sample_cursor += 1;
            vec![VizEffect::RequestFrame]
        }
        UserAction::PromptSubmit => {
            let input = std::mem::take(&mut state.prompt.input);
            state.prompt.reset_navigation();
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return vec![VizEffect::RequestFrame];
            }
            if state.prompt.history.last().map(String::as_str) != Some(trimmed) {
                state.prompt.history.push(trimmed.to_string());
            }
            if trimmed.starts_with('/') {
                run_prompt_command(state, trimmed);
                return vec![VizEffect::RequestFrame];
            }
            submit(state, trimmed)
        }
        UserAction::Submit(query) => submit(state, &query),
        UserAction::Select(id) => {
            select(state, id);
            vec![VizEffect::RequestFrame]
        }
        UserAction::SelectNext | UserAction::SelectPrev => {
            let forward = matches!(action, UserAction::SelectNext);
            let ids: Vec<VizId> = state
                .session
                .visualizations()
                .iter()
                .map(VisualizationSpec::id)
                .collect();
            if ids.is_empty() {
                return Vec::new();
            }
            let current = state
                .session
                .selected_id()
                .and_then(|id| ids.iter().position(|candidate| *candidate == id));
            let next = match (current, forward) {
                (None, true) => 0,
                (None, false) => ids.len() - 1,
                (Some(pos), true) => (pos + 1) % ids.len(),
                (Some(pos), false) => pos.checked_sub(1).unwrap_or(ids.len() - 1),
            };
            select(state, ids[next]);
            vec![VizEffect::RequestFrame]
        }
        UserAction::Deselect => {
            state.session.deselect();
            vec![VizEffect::RequestFrame]
        }
        UserAction::Remove(id) => {
            remove(state, id);
            vec![VizEffect::RequestFrame]
        }
        UserAction::RemoveSelected => {
            let Some(id) = state.session.selected_id() else {
                return Vec::new();
            };
            remove(state, id);
            vec![VizEffect::RequestFrame]
        }
        UserAction::CopySelected => {
            let Some(spec) = state.session.target_hint() else {
                state.session.notice = Some(Notice::new(
                    ErrorKind::UserInput,
                    "Nothing to copy yet",
                ));
                return vec![VizEffect::RequestFrame];
            };
            match serde_json::to_string_pretty(spec) {
                Ok(json) => {
                    let id = spec.id();
                    append_log(
                        state,
                        LogLevel::Info,
                        LogSource::User,
                        format!("Copied {id} to clipboard"),
                    );
                    vec![VizEffect::CopyToClipboard(json), VizEffect::RequestFrame]
                }
                Err(err) => {
                    state.session.notice = Some(Notice::new(
                        ErrorKind::Runtime,
                        format!("Could not encode visualization: {err}"),
                    ));
                    vec![VizEffect::RequestFrame]
                }
            }
        }
        UserAction::ToggleInspector => {
            state.show_inspector = !state.show_inspector;
            vec![VizEffect::RequestFrame]
        }
        UserAction::ToggleFocus => {
            state.focus = state.focus.toggle();
            vec![VizEffect::RequestFrame]
        }
        UserAction::DismissNotice => {
            state.session.notice = None;
            vec![VizEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut DashboardState, action: RuntimeAction) {
    match action {
        RuntimeAction::InterpretationSucceeded { query, spec } => {
            state.session.pending = None;
            let applied = state.session.apply_response(&query, spec);
            tracing::info!(
                id = %applied.id,
                position = applied.position,
                disposition = applied.disposition.label(),
                outcome = applied.outcome.label(),
                "applied collaborator response"
            );
            append_log(
                state,
                LogLevel::Info,
                LogSource::Session,
                format!(
                    "{} ({}) {} at position {}",
                    applied.id,
                    applied.disposition.label(),
                    applied.outcome.label(),
                    applied.position + 1
                ),
            );
            if let Some(ChartKind::Unknown(token)) =
                state.session.get(applied.id).map(|spec| spec.kind.clone())
            {
                tracing::warn!(id = %applied.id, token = %token, "unsupported chart type");
                append_log(
                    state,
                    LogLevel::Warn,
                    LogSource::Collaborator,
                    format!("{} has unsupported chart type {:?}", applied.id, token),
                );
            }
        }
        RuntimeAction::InterpretationFailed { query, message } => {
            state.session.pending = None;
            tracing::warn!(query = %query, error = %message, "interpretation failed");
            state.session.notice = Some(Notice::new(ErrorKind::External, message.clone()));
            append_log(
                state,
                LogLevel::Error,
                LogSource::Collaborator,
                format!("Request failed: {message}"),
            );
        }
        RuntimeAction::SetCollaboratorLabel(label) => {
            state.collaborator_label = label;
        }
        RuntimeAction::AppendLog(message) => {
            append_log(state, LogLevel::Info, LogSource::Session, message);
        }
        RuntimeAction::ClearLogs => {
            state.session.activity.clear();
        }
    }
}

fn submit(state: &mut DashboardState, query: &str) -> Vec<VizEffect> {
    let query = query.trim();
    if query.is_empty() {
        state.session.notice = Some(Notice::new(ErrorKind::UserInput, "Type a request first"));
        return vec![VizEffect::RequestFrame];
    }
    if let Some(pending) = &state.session.pending {
        tracing::debug!(query = %query, "submission ignored while busy");
        let message = format!("Still working on \"{}\"", pending.query);
        state.session.notice = Some(Notice::new(ErrorKind::UserInput, message));
        return vec![VizEffect::RequestFrame];
    }

    let current_viz = state.session.target_hint().cloned();
    let disposition = classify(query);
    state.session.pending = Some(PendingSubmission {
        query: query.to_string(),
        disposition,
        target: current_viz.as_ref().map(VisualizationSpec::id),
    });
    state.session.notice = None;
    tracing::debug!(
        query = %query,
        disposition = disposition.label(),
        hint = ?current_viz.as_ref().map(VisualizationSpec::id),
        "submitting query"
    );
    append_log(
        state,
        LogLevel::Info,
        LogSource::User,
        format!("> {query}"),
    );

    vec![
        VizEffect::Interpret {
            query: query.to_string(),
            current_viz,
        },
        VizEffect::RequestFrame,
    ]
}

fn select(state: &mut DashboardState, id: VizId) {
    if let Err(err) = state.session.select(id) {
        tracing::debug!(%id, "select ignored: {err}");
        append_log(state, LogLevel::Warn, LogSource::User, err.to_string());
    }
}

fn remove(state: &mut DashboardState, id: VizId) {
    if state.session.remove(id) {
        append_log(
            state,
            LogLevel::Info,
            LogSource::User,
            format!("Removed {id}"),
        );
    } else {
        tracing::debug!(%id, "remove of unknown visualization ignored");
    }
}

fn run_prompt_command(state: &mut DashboardState, input: &str) {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();

    match (command, argument) {
        ("/select", Some(arg)) => match arg.parse::<VizId>() {
            Ok(id) => select(state, id),
            Err(_) => usage(state, "/select <id>"),
        },
        ("/delete" | "/remove", Some(arg)) => match arg.parse::<VizId>() {
            Ok(id) => remove(state, id),
            Err(_) => usage(state, "/delete <id>"),
        },
        ("/select", None) => usage(state, "/select <id>"),
        ("/delete" | "/remove", None) => usage(state, "/delete <id>"),
        ("/deselect", _) => state.session.deselect(),
        ("/clearlog", _) => state.session.activity.clear(),
        ("/help", _) => {
            append_log(
                state,
                LogLevel::Info,
                LogSource::Session,
                format!("Commands: {}", PROMPT_COMMANDS.join(", ")),
            );
        }
        (other, _) => {
            state.session.notice = Some(Notice::new(
                ErrorKind::UserInput,
                format!("Unknown command {other}; try /help"),
            ));
        }
    }
}

fn usage(state: &mut DashboardState, text: &str) {
    state.session.notice = Some(Notice::new(ErrorKind::UserInput, format!("Usage: {text}")));
}

fn append_log(state: &mut DashboardState, level: LogLevel, source: LogSource, message: String) {
    state
        .session
        .activity
        .append(LogEntry::new(level, source, message));
}

#[cfg(test)]
mod tests;
