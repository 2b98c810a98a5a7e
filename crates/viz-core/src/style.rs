use super::state::ChartKind;
use super::state::RawVisualization;

/// Color names accepted in styling, matched case-insensitively.
pub const COLOR_TABLE: [(&str, &str); 12] = [
    ("blue", "#0088FE"),
    ("light blue", "#82CAFF"),
    ("dark blue", "#00008B"),
    ("green", "#00C49F"),
    ("red", "#FF8042"),
    ("purple", "#8884d8"),
    ("orange", "#FFBB28"),
    ("pink", "#FF69B4"),
    ("yellow", "#ffc658"),
    ("teal", "#008B8B"),
    ("cyan", "#00CED1"),
    ("indigo", "#4B0082"),
];

/// Per-slice colors for pie charts without an explicit color, cycled by row index.
pub const PIE_PALETTE: [&str; 8] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884d8", "#82ca9d", "#ffc658", "#ff7c7c",
];

/// Series color for bar and scatter charts when styling names none.
pub const DEFAULT_SERIES_COLOR: &str = "#8884d8";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fill {
    /// Nothing to color (tables, unsupported types).
    #[default]
    None,
    /// Cycle [`PIE_PALETTE`] by row index.
    Palette,
    Solid(String),
}

impl Fill {
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Palette => Some(PIE_PALETTE[index % PIE_PALETTE.len()]),
            Self::Solid(color) => Some(color.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub bold_header: bool,
    pub fill: Fill,
    pub axes: Option<AxisLabels>,
}

/// Maps a color name to its code; anything else is returned as given.
pub fn resolve_color(token: Option<&str>) -> Option<String> {
    let token = token?;
    if token.trim().is_empty() {
        return None;
    }
    let lowered = token.trim().to_lowercase();
    let code = COLOR_TABLE
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, code)| *code)
        .unwrap_or(token);
    Some(code.to_string())
}

/// Turns the loose styling of a visualization into concrete render parameters.
///
/// Never fails: unsupported chart types resolve to [`ResolvedStyle::default`].
pub fn resolve_style(viz: &RawVisualization) -> ResolvedStyle {
    let styling = viz.styling.as_ref();
    let raw_color = styling.and_then(|s| s.color.as_deref());
    let color = resolve_color(raw_color);
    let bold_header = styling.is_some_and(|s| s.bold_header());

    match &viz.kind {
        ChartKind::Pie => {
            // Every fresh spec carries the default series color, so only another value counts as a choice.
            let explicit = raw_color.is_some_and(|raw| raw != DEFAULT_SERIES_COLOR);
            let fill = match color {
                Some(color) if explicit => Fill::Solid(color),
                _ => Fill::Palette,
            };
            ResolvedStyle {
                bold_header,
                fill,
                axes: None,
            }
        }
        ChartKind::Bar => ResolvedStyle {
            bold_header,
            fill: Fill::Solid(color.unwrap_or_else(|| DEFAULT_SERIES_COLOR.to_string())),
            axes: None,
        },
        ChartKind::Scatter => {
            let x_key = viz.x_key_or_default().unwrap_or("x");
            let y_key = viz.y_key_or_default().unwrap_or("y");
            ResolvedStyle {
                bold_header,
                fill: Fill::Solid(color.unwrap_or_else(|| DEFAULT_SERIES_COLOR.to_string())),
                axes: Some(AxisLabels {
                    x: styling
                        .and_then(|s| s.x_label.clone())
                        .unwrap_or_else(|| x_key.to_string()),
                    y: styling
                        .and_then(|s| s.y_label.clone())
                        .unwrap_or_else(|| y_key.to_string()),
                }),
            }
        }
        ChartKind::Table => ResolvedStyle {
            bold_header,
            fill: Fill::None,
            axes: None,
        },
        ChartKind::Unknown(_) => ResolvedStyle::default(),
    }
}
