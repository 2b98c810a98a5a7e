use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;

use super::classifier::classify;
use super::classifier::Disposition;
use super::error::SessionError;

/// One data record: field name to scalar value, in the order the collaborator sent them.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VizId(pub u64);

impl fmt::Display for VizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viz-{}", self.0)
    }
}

/// Accepts both `7` and `viz-7`.
impl FromStr for VizId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix("viz-").unwrap_or(s).parse().map(VizId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    Scatter,
    Table,
    /// Missing or unrecognized `type` token, kept verbatim for display.
    Unknown(String),
}

impl Default for ChartKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl ChartKind {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "pie" => Self::Pie,
            "bar" => Self::Bar,
            "scatter" => Self::Scatter,
            "table" => Self::Table,
            _ => Self::Unknown(token.to_string()),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Pie => "pie",
            Self::Bar => "bar",
            Self::Scatter => "scatter",
            Self::Table => "table",
            Self::Unknown(token) => token.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pie => "Pie chart",
            Self::Bar => "Bar chart",
            Self::Scatter => "Scatter plot",
            Self::Table => "Table",
            Self::Unknown(_) => "Unsupported",
        }
    }

    /// Field names a variant binds when `xKey`/`yKey` are absent.
    pub fn default_keys(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Bar => Some(("name", "value")),
            Self::Scatter => Some(("x", "y")),
            _ => None,
        }
    }
}

impl Serialize for ChartKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(ChartKind::from_token)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub bold_header: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub x_label: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub y_label: Option<String>,
}

impl StyleDescriptor {
    pub fn bold_header(&self) -> bool {
        self.bold_header.unwrap_or(false)
    }

    /// Fields set on `self` win; fields left absent keep the value from `previous`.
    pub fn merged_over(self, previous: &StyleDescriptor) -> StyleDescriptor {
        StyleDescriptor {
            color: self.color.or_else(|| previous.color.clone()),
            bold_header: self.bold_header.or(previous.bold_header),
            x_label: self.x_label.or_else(|| previous.x_label.clone()),
            y_label: self.y_label.or_else(|| previous.y_label.clone()),
        }
    }
}

/// A visualization as returned by the collaborator, before the session assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVisualization {
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    #[serde(default, deserialize_with = "lenient_title")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_rows")]
    pub data: Vec<Row>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub x_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub y_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_styling",
        skip_serializing_if = "Option::is_none"
    )]
    pub styling: Option<StyleDescriptor>,
    /// Fields this crate does not interpret (e.g. `data_query`), echoed back to the collaborator.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawVisualization {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn x_key_or_default(&self) -> Option<&str> {
        self.x_key
            .as_deref()
            .or_else(|| self.kind.default_keys().map(|(x, _)| x))
    }

    pub fn y_key_or_default(&self) -> Option<&str> {
        self.y_key
            .as_deref()
            .or_else(|| self.kind.default_keys().map(|(_, y)| y))
    }

    fn inherit_styling(mut self, previous: &RawVisualization) -> Self {
        self.styling = match (self.styling.take(), previous.styling.as_ref()) {
            (Some(next), Some(prev)) => Some(next.merged_over(prev)),
            (None, Some(prev)) => Some(prev.clone()),
            (next, None) => next,
        };
        self
    }
}

/// An immutable visualization owned by a [`SessionState`].
///
/// Fields are readable through `Deref`; a tweak swaps in a new value rather than
/// editing this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationSpec {
    id: VizId,
    #[serde(flatten)]
    body: RawVisualization,
}

impl VisualizationSpec {
    fn new(id: VizId, mut body: RawVisualization) -> Self {
        body.extra.remove("id");
        Self { id, body }
    }

    pub fn id(&self) -> VizId {
        self.id
    }

    pub fn body(&self) -> &RawVisualization {
        &self.body
    }

    pub fn display_title(&self) -> String {
        if self.body.title.trim().is_empty() {
            format!("{} ({})", self.body.kind.label(), self.id)
        } else {
            self.body.title.clone()
        }
    }
}

impl Deref for VisualizationSpec {
    type Target = RawVisualization;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    })
}

fn lenient_rows<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Row>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_styling<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<StyleDescriptor>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    Runtime,
    External,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::UserInput => "user-input",
            Self::Runtime => "runtime",
            Self::External => "external",
        }
    }
}

/// Transient message surfaced to the user; never blocks further input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: Arc<str>,
}

impl Notice {
    pub fn new(kind: ErrorKind, message: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    User,
    Session,
    Collaborator,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<i64>,
    pub source: LogSource,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            ts_ms: None,
            source,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;
        if entry.ts_ms.is_none() {
            entry.ts_ms = Some(chrono::Utc::now().timestamp_millis());
        }

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

pub const DEFAULT_ACTIVITY_CAPACITY: usize = 200;

/// The submission currently awaiting the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub query: String,
    pub disposition: Disposition,
    pub target: Option<VizId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Appended,
    ReplacedSelected,
    ReplacedLast,
}

impl ApplyOutcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Appended => "appended",
            Self::ReplacedSelected => "replaced selected",
            Self::ReplacedLast => "replaced last",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub id: VizId,
    pub position: usize,
    pub disposition: Disposition,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    visualizations: Vec<VisualizationSpec>,
    selected: Option<VizId>,
    next_id: u64,
    pub pending: Option<PendingSubmission>,
    /// Result of the most recent `apply_response`.
    pub last_applied: Option<Applied>,
    pub notice: Option<Notice>,
    pub activity: LogBuffer,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_activity_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }

    pub fn with_activity_capacity(capacity: usize) -> Self {
        Self {
            visualizations: Vec::new(),
            selected: None,
            next_id: 1,
            pending: None,
            last_applied: None,
            notice: None,
            activity: LogBuffer::new(capacity),
        }
    }

    pub fn visualizations(&self) -> &[VisualizationSpec] {
        &self.visualizations
    }

    pub fn get(&self, id: VizId) -> Option<&VisualizationSpec> {
        self.visualizations.iter().find(|viz| viz.id == id)
    }

    pub fn position(&self, id: VizId) -> Option<usize> {
        self.visualizations.iter().position(|viz| viz.id == id)
    }

    /// The selected id, only while it still names a live visualization.
    pub fn selected_id(&self) -> Option<VizId> {
        self.selected.filter(|id| self.position(*id).is_some())
    }

    pub fn selected(&self) -> Option<&VisualizationSpec> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The visualization the collaborator should treat as under discussion:
    /// the selection if any, else the last element.
    pub fn target_hint(&self) -> Option<&VisualizationSpec> {
        self.selected().or_else(|| self.visualizations.last())
    }

    pub fn select(&mut self, id: VizId) -> Result<(), SessionError> {
        if self.position(id).is_none() {
            return Err(SessionError::UnknownVisualization(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Removes `id` if present. Returns whether anything was removed.
    pub fn remove(&mut self, id: VizId) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };
        self.visualizations.remove(position);
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Folds a collaborator response into the collection according to how `query` classifies.
    pub fn apply_response(&mut self, query: &str, raw: RawVisualization) -> Applied {
        let applied = self.resolve_disposition(query, raw);
        self.last_applied = Some(applied);
        applied
    }

    fn resolve_disposition(&mut self, query: &str, raw: RawVisualization) -> Applied {
        let disposition = classify(query);
        if disposition == Disposition::New {
            return self.append(disposition, raw);
        }

        let target = match self.selected_id().and_then(|id| self.position(id)) {
            Some(position) => Some((position, ApplyOutcome::ReplacedSelected)),
            None => self
                .visualizations
                .len()
                .checked_sub(1)
                .map(|position| (position, ApplyOutcome::ReplacedLast)),
        };

        let Some((position, outcome)) = target else {
            return self.append(disposition, raw);
        };

        let previous = &self.visualizations[position];
        let id = previous.id;
        let body = raw.inherit_styling(&previous.body);
        self.visualizations[position] = VisualizationSpec::new(id, body);
        self.selected = None;

        Applied {
            id,
            position,
            disposition,
            outcome,
        }
    }

    fn append(&mut self, disposition: Disposition, raw: RawVisualization) -> Applied {
        let id = self.allocate_id();
        self.visualizations.push(VisualizationSpec::new(id, raw));
        self.selected = None;
        Applied {
            id,
            position: self.visualizations.len() - 1,
            disposition,
            outcome: ApplyOutcome::Appended,
        }
    }

    fn allocate_id(&mut self) -> VizId {
        let id = VizId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Charts,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Prompt => Self::Charts,
            Self::Charts => Self::Prompt,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptState {
    pub input: String,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
    /// Text the user had typed when sample cycling started.
    pub sample_filter: Option<String>,
    pub sample_cursor: usize,
}

impl PromptState {
    pub fn reset_navigation(&mut self) {
        self.history_index = None;
        self.sample_filter = None;
        self.sample_cursor = 0;
    }
}

/// Everything the terminal front end renders: the session plus prompt and layout state.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub session: SessionState,
    pub prompt: PromptState,
    pub focus: Focus,
    pub show_inspector: bool,
    pub collaborator_label: String,
}

impl DashboardState {
    pub fn new(session: SessionState) -> Self {
        Self {
            session,
            prompt: PromptState::default(),
            focus: Focus::Prompt,
            show_inspector: false,
            collaborator_label: "http".to_string(),
        }
    }
}
