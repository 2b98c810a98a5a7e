//! Render plans: the input contract for whatever draws a visualization.
//!
//! A plan is fully style-resolved and never fails to build; missing or malformed
//! data yields empty series rather than an error.

use serde_json::Value;

use super::state::ChartKind;
use super::state::Row;
use super::state::VisualizationSpec;
use super::state::VizId;
use super::style::resolve_style;
use super::style::DEFAULT_SERIES_COLOR;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanHeader {
    pub id: VizId,
    pub title: String,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    /// `None` when the row has no numeric value under the y key.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub x_key: String,
    pub y_key: String,
    pub color: String,
    pub bars: Vec<BarPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub x_label: String,
    pub y_label: String,
    pub color: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableGrid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanBody {
    Pie(Vec<PieSlice>),
    Bar(BarSeries),
    Scatter(ScatterSeries),
    Table(TableGrid),
    /// The `type` token was missing or not one we draw.
    Empty { token: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub header: PlanHeader,
    pub body: PlanBody,
}

pub fn plan(spec: &VisualizationSpec) -> RenderPlan {
    let style = resolve_style(spec);
    let header = PlanHeader {
        id: spec.id(),
        title: spec.title.clone(),
        bold: style.bold_header,
    };
    let series_color = style
        .fill
        .color_at(0)
        .unwrap_or(DEFAULT_SERIES_COLOR)
        .to_string();

    let body = match &spec.kind {
        ChartKind::Pie => PlanBody::Pie(
            spec.data
                .iter()
                .enumerate()
                .map(|(index, row)| PieSlice {
                    label: cell_text(row.get("name")),
                    value: numeric(row.get("value")).unwrap_or(0.0),
                    color: style
                        .fill
                        .color_at(index)
                        .unwrap_or(DEFAULT_SERIES_COLOR)
                        .to_string(),
                })
                .collect(),
        ),
        ChartKind::Bar => {
            let x_key = spec.x_key_or_default().unwrap_or("name").to_string();
            let y_key = spec.y_key_or_default().unwrap_or("value").to_string();
            let bars = spec
                .data
                .iter()
                .map(|row| BarPoint {
                    label: cell_text(row.get(&x_key)),
                    value: numeric(row.get(&y_key)),
                })
                .collect();
            PlanBody::Bar(BarSeries {
                x_key,
                y_key,
                color: series_color,
                bars,
            })
        }
        ChartKind::Scatter => {
            let x_key = spec.x_key_or_default().unwrap_or("x");
            let y_key = spec.y_key_or_default().unwrap_or("y");
            let (x_label, y_label) = match style.axes {
                Some(axes) => (axes.x, axes.y),
                None => (x_key.to_string(), y_key.to_string()),
            };
            let points = spec
                .data
                .iter()
                .filter_map(|row| Some((numeric(row.get(x_key))?, numeric(row.get(y_key))?)))
                .collect();
            PlanBody::Scatter(ScatterSeries {
                x_label,
                y_label,
                color: series_color,
                points,
            })
        }
        ChartKind::Table => PlanBody::Table(table_grid(&spec.data)),
        ChartKind::Unknown(token) => PlanBody::Empty {
            token: token.clone(),
        },
    };

    RenderPlan { header, body }
}

/// Columns come from the first row only; later rows missing a column render blank cells.
fn table_grid(data: &[Row]) -> TableGrid {
    let columns: Vec<String> = data
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let rows = data
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| cell_text(row.get(column)))
                .collect()
        })
        .collect();
    TableGrid { columns, rows }
}

pub fn numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::state::RawVisualization;
    use crate::state::SessionState;

    fn spec(value: Value) -> VisualizationSpec {
        let raw: RawVisualization = serde_json::from_value(value).expect("decode");
        let mut state = SessionState::new();
        let applied = state.apply_response("a new chart", raw);
        state.get(applied.id).expect("spec").clone()
    }

    #[test]
    fn pie_slices_cycle_palette_by_row() {
        let plan = plan(&spec(json!({
            "type": "pie",
            "title": "Industry Breakdown",
            "data": [
                { "name": "Fintech", "value": 12 },
                { "name": "Security", "value": "7" },
                { "name": "DevTools" }
            ]
        })));

        assert_eq!(plan.header.title, "Industry Breakdown");
        let PlanBody::Pie(slices) = plan.body else {
            panic!("expected pie");
        };
        let summary: Vec<(&str, f64, &str)> = slices
            .iter()
            .map(|s| (s.label.as_str(), s.value, s.color.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Fintech", 12.0, "#0088FE"),
                ("Security", 7.0, "#00C49F"),
                ("DevTools", 0.0, "#FFBB28"),
            ]
        );
    }

    #[test]
    fn pie_without_data_is_empty() {
        let plan = plan(&spec(json!({ "type": "pie" })));
        assert_eq!(plan.body, PlanBody::Pie(Vec::new()));
    }

    #[test]
    fn bar_uses_default_keys_and_blanks_missing_values() {
        let plan = plan(&spec(json!({
            "type": "bar",
            "data": [{ "name": "Fintech", "value": 4 }, { "name": "Health" }],
            "styling": { "color": "red" }
        })));

        assert_eq!(
            plan.body,
            PlanBody::Bar(BarSeries {
                x_key: "name".to_string(),
                y_key: "value".to_string(),
                color: "#FF8042".to_string(),
                bars: vec![
                    BarPoint {
                        label: "Fintech".to_string(),
                        value: Some(4.0),
                    },
                    BarPoint {
                        label: "Health".to_string(),
                        value: None,
                    },
                ],
            })
        );
    }

    #[test]
    fn scatter_skips_rows_missing_a_coordinate() {
        let plan = plan(&spec(json!({
            "type": "scatter",
            "data": [{ "x": 2010, "y": 3.5 }, { "x": 2012 }, { "x": "2015", "y": "1.25" }],
            "styling": { "xLabel": "Founded Year" }
        })));

        let PlanBody::Scatter(series) = plan.body else {
            panic!("expected scatter");
        };
        assert_eq!(series.x_label, "Founded Year");
        assert_eq!(series.y_label, "y");
        assert_eq!(series.color, DEFAULT_SERIES_COLOR);
        assert_eq!(series.points, vec![(2010.0, 3.5), (2015.0, 1.25)]);
    }

    #[test]
    fn table_columns_come_from_first_row_in_order() {
        let plan = plan(&spec(json!({
            "type": "table",
            "styling": { "boldHeader": true },
            "data": [
                { "name": "Sequoia", "value": 9 },
                { "value": 4, "name": "Accel", "extra": true }
            ]
        })));

        assert!(plan.header.bold);
        assert_eq!(
            plan.body,
            PlanBody::Table(TableGrid {
                columns: vec!["name".to_string(), "value".to_string()],
                rows: vec![
                    vec!["Sequoia".to_string(), "9".to_string()],
                    vec!["Accel".to_string(), "4".to_string()],
                ],
            })
        );
    }

    #[test]
    fn empty_table_has_no_columns_or_rows() {
        let plan = plan(&spec(json!({ "type": "table", "data": [] })));
        assert_eq!(
            plan.body,
            PlanBody::Table(TableGrid {
                columns: Vec::new(),
                rows: Vec::new(),
            })
        );
    }

    #[test]
    fn unknown_type_plans_empty_body() {
        let plan = plan(&spec(json!({ "type": "line", "title": "Trend" })));
        assert_eq!(plan.header.title, "Trend");
        assert_eq!(
            plan.body,
            PlanBody::Empty {
                token: "line".to_string()
            }
        );
    }
}
