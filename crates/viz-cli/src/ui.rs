use std::io;
use std::sync::mpsc;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, List,
    ListItem, ListState, Paragraph, Row, Table, Wrap,
};
use ratatui::Frame;
use ratatui::Terminal;

use viz_core::actions::{DashboardAction, RuntimeAction, UserAction};
use viz_core::reducer::{reduce, VizEffect};
use viz_core::render::{self, BarSeries, PieSlice, PlanBody, RenderPlan, ScatterSeries, TableGrid};
use viz_core::state::{DashboardState, ErrorKind, Focus, LogLevel, VisualizationSpec};
use viz_exec::{spawn_interpretation, Interpreter};

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

const INSPECTOR_THEME: &str = "base16-ocean.dark";
const CHART_MIN_HEIGHT: u16 = 10;
const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            crossterm::cursor::Show
        );
    }
}

pub fn run(
    mut state: DashboardState,
    interpreter: Arc<dyn Interpreter>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut state, interpreter).map_err(|e| e.into())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DashboardState,
    interpreter: Arc<dyn Interpreter>,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel::<RuntimeAction>();

    loop {
        while let Ok(action) = rx.try_recv() {
            reduce(state, DashboardAction::Runtime(action));
        }

        terminal.draw(|f| ui(f, state))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let effects = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match key_command(key, state.focus, state.session.notice.is_some()) {
                    KeyCommand::Exit => return Ok(()),
                    KeyCommand::Dispatch(action) => reduce(state, DashboardAction::User(action)),
                    KeyCommand::Ignore => Vec::new(),
                }
            }
            Event::Paste(text) => reduce(state, DashboardAction::User(UserAction::PromptPaste(text))),
            _ => Vec::new(),
        };

        for effect in effects {
            run_effect(effect, state, &interpreter, &tx);
        }
    }
}

fn run_effect(
    effect: VizEffect,
    state: &mut DashboardState,
    interpreter: &Arc<dyn Interpreter>,
    tx: &Sender<RuntimeAction>,
) {
    match effect {
        VizEffect::RequestFrame => {}
        VizEffect::Interpret { query, current_viz } => {
            spawn_interpretation(Arc::clone(interpreter), query, current_viz, tx.clone());
        }
        VizEffect::CopyToClipboard(text) => {
            let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
            if let Err(err) = copied {
                tracing::warn!(error = %err, "clipboard unavailable");
                reduce(
                    state,
                    DashboardAction::Runtime(RuntimeAction::AppendLog(format!(
                        "Clipboard unavailable: {err}"
                    ))),
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum KeyCommand {
    Exit,
    Dispatch(UserAction),
    Ignore,
}

fn key_command(key: KeyEvent, focus: Focus, has_notice: bool) -> KeyCommand {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => KeyCommand::Exit,
            KeyCode::Char('y') => KeyCommand::Dispatch(UserAction::CopySelected),
            KeyCode::Char('o') => KeyCommand::Dispatch(UserAction::ToggleInspector),
            KeyCode::Char('u') if focus == Focus::Prompt => {
                KeyCommand::Dispatch(UserAction::PromptClear)
            }
            _ => KeyCommand::Ignore,
        };
    }
    if key.code == KeyCode::BackTab {
        return KeyCommand::Dispatch(UserAction::ToggleFocus);
    }

    let action = match focus {
        Focus::Prompt => match key.code {
            KeyCode::Enter => UserAction::PromptSubmit,
            KeyCode::Backspace => UserAction::PromptBackspace,
            KeyCode::Up => UserAction::PromptHistoryPrev,
            KeyCode::Down => UserAction::PromptHistoryNext,
            KeyCode::Tab => UserAction::PromptCycleSample,
            KeyCode::Esc if has_notice => UserAction::DismissNotice,
            KeyCode::Esc => UserAction::ToggleFocus,
            KeyCode::Char(c) => UserAction::PromptInput(c),
            _ => return KeyCommand::Ignore,
        },
        Focus::Charts => match key.code {
            KeyCode::Char('q') => return KeyCommand::Exit,
            KeyCode::Up | KeyCode::Char('k') => UserAction::SelectPrev,
            KeyCode::Down | KeyCode::Char('j') => UserAction::SelectNext,
            KeyCode::Delete | KeyCode::Char('d') => UserAction::RemoveSelected,
            KeyCode::Char('i') => UserAction::ToggleInspector,
            KeyCode::Char('y') => UserAction::CopySelected,
            KeyCode::Esc if has_notice => UserAction::DismissNotice,
            KeyCode::Esc => UserAction::Deselect,
            KeyCode::Tab | KeyCode::Enter | KeyCode::Char('/') => UserAction::ToggleFocus,
            _ => return KeyCommand::Ignore,
        },
    };
    KeyCommand::Dispatch(action)
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    frames[(millis / 100) as usize % frames.len()]
}

fn ui(f: &mut Frame, state: &DashboardState) {
    let notice_h = if state.session.notice.is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),        // Header
            Constraint::Min(8),           // Content
            Constraint::Length(notice_h), // Notice
            Constraint::Length(3),        // Prompt
            Constraint::Length(1),        // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], state);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(chunks[1]);
    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(content[0]);
    render_chart_list(f, sidebar[0], state);
    render_activity(f, sidebar[1], state);

    let hint = state.session.target_hint();
    if state.show_inspector {
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(content[1]);
        render_charts(f, main[0], state, hint);
        render_inspector(f, main[1], hint);
    } else {
        render_charts(f, content[1], state, hint);
    }

    if let Some(notice) = &state.session.notice {
        let color = match notice.kind {
            ErrorKind::UserInput => Color::Yellow,
            ErrorKind::Runtime => Color::Magenta,
            ErrorKind::External => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", notice.kind.label()),
                Style::default().fg(Color::Black).bg(color),
            ),
            Span::styled(format!(" {}", notice.message), Style::default().fg(color)),
            Span::styled("  (Esc to dismiss)", Style::default().fg(MUTED)),
        ]);
        f.render_widget(Paragraph::new(line), chunks[2]);
    }

    render_prompt(f, chunks[3], state);
    render_footer(f, chunks[4], state.focus);
}

fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let session = &state.session;
    let selected = session
        .selected_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    let status = match &session.pending {
        Some(pending) => format!("{} interpreting ({})", get_spinner(), pending.disposition.label()),
        None => "idle".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            " vizboard ",
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " collaborator: {} | charts: {} | selected: {} | {}",
            state.collaborator_label,
            session.visualizations().len(),
            selected,
            status
        )),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn panel(title: impl Into<String>, active: bool) -> Block<'static> {
    let border = if active { ACCENT } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title.into()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

/// Chart titles are bold only when the spec asks for a bold header.
fn chart_panel(title: String, highlighted: bool, bold: bool) -> Block<'static> {
    let border = if highlighted { ACCENT } else { Color::Gray };
    let mut title_style = Style::default();
    if bold {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(format!(" {title} "), title_style))
}

fn render_chart_list(f: &mut Frame, area: Rect, state: &DashboardState) {
    let session = &state.session;
    let hint_id = session.target_hint().map(VisualizationSpec::id);
    let items: Vec<ListItem> = session
        .visualizations()
        .iter()
        .map(|viz| {
            let marker = if Some(viz.id()) == hint_id { "▸ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<7}", viz.id().to_string()), Style::default().fg(MUTED)),
                Span::raw(viz.display_title()),
            ]))
        })
        .collect();

    let mut list_state = ListState::default()
        .with_selected(session.selected_id().and_then(|id| session.position(id)));
    let items = if items.is_empty() {
        vec![ListItem::new(Span::styled(
            "No charts yet. Ask for one below.",
            Style::default().fg(MUTED),
        ))]
    } else {
        items
    };
    let list = List::new(items)
        .block(panel("Charts", state.focus == Focus::Charts))
        .highlight_style(Style::default().bg(MUTED).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_activity(f: &mut Frame, area: Rect, state: &DashboardState) {
    let visible = area.height.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = state
        .session
        .activity
        .iter()
        .rev()
        .take(visible)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Debug => MUTED,
                LogLevel::Info => Color::Gray,
                LogLevel::Warn => Color::Yellow,
                LogLevel::Error => Color::Red,
            };
            let stamp = entry
                .ts_ms
                .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
                .map(|ts| ts.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{stamp} "), Style::default().fg(MUTED)),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ])
        })
        .collect();
    lines.reverse();
    let p = Paragraph::new(lines)
        .block(panel("Activity", false))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

/// Stacks every chart in display order, scrolled so the tweak target stays in view.
fn render_charts(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    hint: Option<&VisualizationSpec>,
) {
    let Some(target) = hint else {
        let p = Paragraph::new(vec![
            Line::from(""),
            Line::from("Describe a chart in the prompt, e.g."),
            Line::from(Span::styled(
                "\"Create a pie chart representing industry breakdown\"",
                Style::default().fg(ACCENT),
            )),
            Line::from(""),
            Line::from(Span::styled("Tab cycles sample queries.", Style::default().fg(MUTED))),
        ])
        .alignment(Alignment::Center)
        .block(panel("Visualization", false));
        f.render_widget(p, area);
        return;
    };

    let charts = state.session.visualizations();
    let focus = state.session.position(target.id()).unwrap_or(0);
    let capacity = usize::from((area.height / CHART_MIN_HEIGHT).max(1));
    let (start, end) = visible_window(charts.len(), focus, capacity);
    let shown = &charts[start..end];
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, shown.len() as u32); shown.len()])
        .split(area);
    for (slot, viz) in slots.iter().zip(shown) {
        render_chart(f, *slot, state, viz, viz.id() == target.id());
    }
}

/// Range of at most `capacity` charts that contains `focus`.
fn visible_window(len: usize, focus: usize, capacity: usize) -> (usize, usize) {
    let capacity = capacity.clamp(1, len.max(1));
    let start = focus
        .saturating_sub(capacity - 1)
        .min(len.saturating_sub(capacity));
    (start, (start + capacity).min(len))
}

fn render_chart(
    f: &mut Frame,
    area: Rect,
    state: &DashboardState,
    viz: &VisualizationSpec,
    is_target: bool,
) {
    let plan = render::plan(viz);
    let scope = match (is_target, state.session.selected_id() == Some(viz.id())) {
        (true, true) => " selected",
        (true, false) => " latest",
        _ => "",
    };
    let title = format!(
        "{} | {} | {}{}",
        viz.display_title(),
        viz.kind.label(),
        viz.id(),
        scope
    );
    render_plan(f, area, &plan, chart_panel(title, is_target, plan.header.bold));
}

fn render_plan(f: &mut Frame, area: Rect, plan: &RenderPlan, block: Block<'static>) {
    match &plan.body {
        PlanBody::Pie(slices) => {
            let width = area.width.saturating_sub(2);
            let p = Paragraph::new(pie_lines(slices, width)).block(block);
            f.render_widget(p, area);
        }
        PlanBody::Bar(series) => render_bar(f, area, series, block),
        PlanBody::Scatter(series) => render_scatter(f, area, series, block),
        PlanBody::Table(grid) => render_table(f, area, grid, plan.header.bold, block),
        PlanBody::Empty { token } => {
            let message = if token.trim().is_empty() {
                "This visualization has no chart type.".to_string()
            } else {
                format!("Unsupported chart type \"{token}\".")
            };
            let p = Paragraph::new(message)
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(p, area);
        }
    }
}

fn empty_body(f: &mut Frame, area: Rect, block: Block<'static>) {
    let p = Paragraph::new(Span::styled("No data", Style::default().fg(MUTED)))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, area);
}

/// Fraction of the total each slice covers; negative values count as zero.
fn pie_shares(slices: &[PieSlice]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    slices
        .iter()
        .map(|s| if total > 0.0 { s.value.max(0.0) / total } else { 0.0 })
        .collect()
}

fn pie_lines(slices: &[PieSlice], width: u16) -> Vec<Line<'static>> {
    if slices.is_empty() {
        return vec![Line::from(Span::styled("No data", Style::default().fg(MUTED)))];
    }
    let label_w = slices
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let bar_room = f64::from(width.saturating_sub(label_w as u16 + 20).max(4));

    slices
        .iter()
        .zip(pie_shares(slices))
        .map(|(slice, share)| {
            let color = hex_color(&slice.color);
            let label: String = slice.label.chars().take(label_w).collect();
            let cells = (share * bar_room).round() as usize;
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(format!("{label:<label_w$} ")),
                Span::styled("█".repeat(cells), Style::default().fg(color)),
                Span::raw(format!(" {} ({:.0}%)", format_value(slice.value), share * 100.0)),
            ])
        })
        .collect()
}

fn render_bar(f: &mut Frame, area: Rect, series: &BarSeries, block: Block<'static>) {
    if series.bars.is_empty() {
        empty_body(f, area, block);
        return;
    }
    let color = hex_color(&series.color);
    let max = series
        .bars
        .iter()
        .filter_map(|b| b.value)
        .fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { 1000.0 / max } else { 1.0 };
    let bars: Vec<Bar> = series
        .bars
        .iter()
        .map(|point| {
            let (value, text) = match point.value {
                Some(v) => ((v.max(0.0) * scale).round() as u64, format_value(v)),
                None => (0, "-".to_string()),
            };
            Bar::default()
                .value(value)
                .text_value(text)
                .label(Line::from(point.label.clone()))
                .style(Style::default().fg(color))
        })
        .collect();

    let count = bars.len() as u16;
    let bar_width = (area.width.saturating_sub(2) / count.max(1))
        .saturating_sub(1)
        .clamp(1, 12);
    let chart = BarChart::default()
        .block(block.title_bottom(Line::from(format!(" {} by {} ", series.y_key, series.x_key))))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .value_style(Style::default().fg(Color::Black).bg(color));
    f.render_widget(chart, area);
}

/// Axis bounds with a little padding; a single value gets a unit window.
fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if (max - min).abs() < f64::EPSILON {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * 0.05;
    [min - pad, max + pad]
}

fn render_scatter(f: &mut Frame, area: Rect, series: &ScatterSeries, block: Block<'static>) {
    if series.points.is_empty() {
        empty_body(f, area, block);
        return;
    }
    let color = hex_color(&series.color);
    let x_bounds = axis_bounds(series.points.iter().map(|p| p.0));
    let y_bounds = axis_bounds(series.points.iter().map(|p| p.1));
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(color))
        .data(&series.points);
    let axis = |title: &str, bounds: [f64; 2]| {
        Axis::default()
            .title(Span::styled(title.to_string(), Style::default().fg(MUTED)))
            .bounds(bounds)
            .labels(vec![
                Span::raw(format_value(bounds[0])),
                Span::raw(format_value((bounds[0] + bounds[1]) / 2.0)),
                Span::raw(format_value(bounds[1])),
            ])
    };
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(axis(&series.x_label, x_bounds))
        .y_axis(axis(&series.y_label, y_bounds));
    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, grid: &TableGrid, bold: bool, block: Block<'static>) {
    if grid.columns.is_empty() {
        empty_body(f, area, block);
        return;
    }
    let mut header_style = Style::default().fg(Color::Yellow);
    if bold {
        header_style = header_style.add_modifier(Modifier::BOLD);
    }
    let header = Row::new(grid.columns.iter().map(|c| Cell::from(c.clone()))).style(header_style);
    let rows = grid
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.clone()))));
    let columns = grid.columns.len() as u32;
    let widths = vec![Constraint::Ratio(1, columns); grid.columns.len()];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(block);
    f.render_widget(table, area);
}

fn render_inspector(f: &mut Frame, area: Rect, hint: Option<&VisualizationSpec>) {
    let block = panel("Spec (Ctrl+Y copies)", false);
    let Some(viz) = hint else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };
    let json = serde_json::to_string_pretty(viz).unwrap_or_else(|err| format!("<{err}>"));
    let p = Paragraph::new(highlight_json(&json)).block(block);
    f.render_widget(p, area);
}

fn highlight_json(json: &str) -> Vec<Line<'static>> {
    let ps = get_syntax_set();
    let ts = get_theme_set();
    let (Some(syntax), Some(theme)) = (ps.find_syntax_by_extension("json"), ts.themes.get(INSPECTOR_THEME))
    else {
        return json.lines().map(|line| Line::from(line.to_string())).collect();
    };
    let mut h = HighlightLines::new(syntax, theme);
    LinesWithEndings::from(json)
        .map(|line| {
            let ranges: Vec<(syntect::highlighting::Style, &str)> =
                h.highlight_line(line, ps).unwrap_or_default();
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    Span::styled(text.trim_end_matches('\n').to_string(), Style::default().fg(fg))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_prompt(f: &mut Frame, area: Rect, state: &DashboardState) {
    let active = state.focus == Focus::Prompt;
    let title = match &state.session.pending {
        Some(pending) => {
            let target = pending
                .target
                .map(|id| format!(" for {id}"))
                .unwrap_or_default();
            format!("Ask | {} working on \"{}\"{}", get_spinner(), pending.query, target)
        }
        None => "Ask".to_string(),
    };
    let p = Paragraph::new(state.prompt.input.as_str()).block(panel(title, active));
    f.render_widget(p, area);

    if active {
        let typed = state.prompt.input.chars().count() as u16;
        let x = (area.x + 1 + typed).min(area.right().saturating_sub(2));
        f.set_cursor_position((x, area.y + 1));
    }
}

fn render_footer(f: &mut Frame, area: Rect, focus: Focus) {
    let hints = match focus {
        Focus::Prompt => {
            "Enter submit | Tab sample | Up/Down history | Esc charts | Ctrl+O spec | Ctrl+C quit"
        }
        Focus::Charts => {
            "Up/Down select | Esc deselect | d delete | y copy | i spec | Tab prompt | q quit"
        }
    };
    f.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(MUTED))),
        area,
    );
}

/// `#rrggbb` and `#rgb` become true colors; anything else is tried as a color name.
fn hex_color(code: &str) -> Color {
    let code = code.trim();
    if let Some(hex) = code.strip_prefix('#').filter(|hex| hex.is_ascii()) {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let rgb = match hex.len() {
            6 => channel(&hex[0..2]).zip(channel(&hex[2..4])).zip(channel(&hex[4..6])),
            3 => {
                let wide = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                wide(0).zip(wide(1)).zip(wide(2))
            }
            _ => None,
        };
        if let Some(((r, g), b)) = rgb {
            return Color::Rgb(r, g, b);
        }
    }
    code.parse::<Color>().unwrap_or(Color::Gray)
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
