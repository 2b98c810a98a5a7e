//! Offline collaborator driven by keyword rules over a small built-in SaaS dataset.
//!
//! Deterministic, so it backs demos and tests; it is not a language model.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use serde_json::json;
use serde_json::Value;
use viz_core::ChartKind;
use viz_core::RawVisualization;
use viz_core::Row;
use viz_core::StyleDescriptor;
use viz_core::COLOR_TABLE;
use viz_core::DEFAULT_SERIES_COLOR;
use viz_core::TWEAK_TOKENS;

use crate::contracts::DatasetInfo;
use crate::contracts::DatasetShape;
use crate::contracts::HealthReport;
use crate::contracts::InterpretRequest;
use crate::error::InterpretError;
use crate::interpreter::Interpreter;

const GROUP_LIMIT: usize = 20;
const RAW_LIMIT: usize = 50;
const SAMPLE_ROWS: usize = 3;

pub const COLUMNS: [&str; 11] = [
    "Company Name",
    "Founded Year",
    "HQ",
    "Industry",
    "Total Funding",
    "ARR",
    "Valuation",
    "Employees",
    "Top Investors",
    "Product",
    "G2 Rating",
];

struct Company {
    name: &'static str,
    founded: i64,
    hq: &'static str,
    industry: &'static str,
    total_funding: &'static str,
    arr: &'static str,
    valuation: &'static str,
    employees: u64,
    top_investors: &'static str,
    product: &'static str,
    g2_rating: f64,
}

static COMPANIES: [Company; 12] = [
    Company {
        name: "Ledgerly",
        founded: 2012,
        hq: "New York, USA",
        industry: "Fintech",
        total_funding: "$1.2B",
        arr: "$450M",
        valuation: "$9.5B",
        employees: 2100,
        top_investors: "Sequoia, Accel, Tiger Global",
        product: "Spend management",
        g2_rating: 4.6,
    },
    Company {
        name: "Shieldpoint",
        founded: 2015,
        hq: "Tel Aviv, Israel",
        industry: "Security",
        total_funding: "$820M",
        arr: "$310M",
        valuation: "$6.1B",
        employees: 1400,
        top_investors: "Index Ventures, Accel",
        product: "Cloud posture",
        g2_rating: 4.5,
    },
    Company {
        name: "Buildkite Labs",
        founded: 2013,
        hq: "Melbourne, Australia",
        industry: "DevTools",
        total_funding: "$180M",
        arr: "$75M",
        valuation: "$1.1B",
        employees: 350,
        top_investors: "Sequoia, Insight Partners",
        product: "CI pipelines",
        g2_rating: 4.7,
    },
    Company {
        name: "Carepath",
        founded: 2016,
        hq: "Boston, USA",
        industry: "Healthtech",
        total_funding: "$540M",
        arr: "$160M",
        valuation: "$3.4B",
        employees: 900,
        top_investors: "General Catalyst, Andreessen Horowitz",
        product: "Care coordination",
        g2_rating: 4.2,
    },
    Company {
        name: "Paystream",
        founded: 2010,
        hq: "San Francisco, USA",
        industry: "Fintech",
        total_funding: "$2.3B",
        arr: "$1.1B",
        valuation: "$22B",
        employees: 5200,
        top_investors: "Tiger Global, Sequoia, Coatue",
        product: "Payments API",
        g2_rating: 4.4,
    },
    Company {
        name: "Vaultline",
        founded: 2018,
        hq: "London, UK",
        industry: "Security",
        total_funding: "$260M",
        arr: "$90M",
        valuation: "$1.8B",
        employees: 480,
        top_investors: "Accel, Index Ventures",
        product: "Secrets management",
        g2_rating: 4.6,
    },
    Company {
        name: "Metricly",
        founded: 2014,
        hq: "Austin, USA",
        industry: "Analytics",
        total_funding: "$410M",
        arr: "$140M",
        valuation: "$2.9B",
        employees: 760,
        top_investors: "Insight Partners, Coatue",
        product: "Product analytics",
        g2_rating: 4.3,
    },
    Company {
        name: "Deployd",
        founded: 2019,
        hq: "Berlin, Germany",
        industry: "DevTools",
        total_funding: "$95M",
        arr: "$28M",
        valuation: "$600M",
        employees: 190,
        top_investors: "Accel",
        product: "Preview environments",
        g2_rating: 4.8,
    },
    Company {
        name: "Talentforge",
        founded: 2011,
        hq: "Toronto, Canada",
        industry: "HR Tech",
        total_funding: "$330M",
        arr: "$120M",
        valuation: "N/A",
        employees: 1100,
        top_investors: "General Catalyst, Sequoia",
        product: "Recruiting suite",
        g2_rating: 4.1,
    },
    Company {
        name: "Quantive",
        founded: 2017,
        hq: "Singapore",
        industry: "Fintech",
        total_funding: "$150M",
        arr: "$60M",
        valuation: "$1.2B (2023)",
        employees: 420,
        top_investors: "Coatue, Tiger Global",
        product: "Treasury automation",
        g2_rating: 4.4,
    },
    Company {
        name: "Signalwise",
        founded: 2020,
        hq: "Paris, France",
        industry: "Analytics",
        total_funding: "$70M",
        arr: "$18M",
        valuation: "$450M",
        employees: 130,
        top_investors: "Index Ventures, Andreessen Horowitz",
        product: "Revenue intelligence",
        g2_rating: 4.5,
    },
    Company {
        name: "Stackguard",
        founded: 2009,
        hq: "Seattle, USA",
        industry: "Security",
        total_funding: "$1.6B",
        arr: "$780M",
        valuation: "$1.4T",
        employees: 6400,
        top_investors: "Andreessen Horowitz, Insight Partners, Sequoia",
        product: "Endpoint protection",
        g2_rating: 4.3,
    },
];

/// How a response's `data` rows are derived; echoed back as `data_query`.
#[derive(Debug, Clone, PartialEq)]
enum DataQuery {
    GroupBy { column: &'static str, limit: usize },
    Frequency { column: &'static str, limit: usize },
    Raw { x_column: &'static str, y_column: &'static str },
}

impl DataQuery {
    fn to_value(&self) -> Value {
        match self {
            Self::GroupBy { column, limit } => json!({
                "operation": "group_by",
                "column": column,
                "agg_function": "count",
                "limit": limit,
            }),
            Self::Frequency { column, limit } => json!({
                "operation": "frequency",
                "column": column,
                "limit": limit,
            }),
            Self::Raw { x_column, y_column } => json!({
                "operation": "raw",
                "x_column": x_column,
                "y_column": y_column,
            }),
        }
    }

    fn execute(&self) -> Vec<Row> {
        match self {
            Self::GroupBy { column, limit } => {
                let values = COMPANIES.iter().filter_map(|c| c.text(column));
                count_rows(values, *limit)
            }
            Self::Frequency { column, limit } => {
                let values = COMPANIES
                    .iter()
                    .filter_map(|c| c.text(column))
                    .flat_map(|cell| {
                        cell.split(',')
                            .map(|part| part.trim().to_string())
                            .filter(|part| !part.is_empty())
                            .collect::<Vec<_>>()
                    });
                count_rows(values, *limit)
            }
            Self::Raw { x_column, y_column } => COMPANIES
                .iter()
                .filter_map(|c| Some((c.number(x_column)?, c.number(y_column)?)))
                .take(RAW_LIMIT)
                .map(|(x, y)| {
                    let mut row = Row::new();
                    row.insert("x".to_string(), json!(x));
                    row.insert("y".to_string(), json!(y));
                    row
                })
                .collect(),
        }
    }
}

impl Company {
    fn text(&self, column: &str) -> Option<String> {
        let text = match column {
            "Company Name" => self.name.to_string(),
            "Founded Year" => self.founded.to_string(),
            "HQ" => self.hq.to_string(),
            "Industry" => self.industry.to_string(),
            "Total Funding" => self.total_funding.to_string(),
            "ARR" => self.arr.to_string(),
            "Valuation" => self.valuation.to_string(),
            "Employees" => self.employees.to_string(),
            "Top Investors" => self.top_investors.to_string(),
            "Product" => self.product.to_string(),
            "G2 Rating" => self.g2_rating.to_string(),
            _ => return None,
        };
        Some(text)
    }

    fn number(&self, column: &str) -> Option<f64> {
        match column {
            "Founded Year" => Some(self.founded as f64),
            "Employees" => Some(self.employees as f64),
            "G2 Rating" => Some(self.g2_rating),
            "Total Funding" => parse_currency(self.total_funding),
            "ARR" => parse_currency(self.arr),
            "Valuation" => parse_currency(self.valuation),
            _ => None,
        }
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("Company Name".to_string(), json!(self.name));
        row.insert("Founded Year".to_string(), json!(self.founded));
        row.insert("HQ".to_string(), json!(self.hq));
        row.insert("Industry".to_string(), json!(self.industry));
        row.insert("Total Funding".to_string(), json!(self.total_funding));
        row.insert("ARR".to_string(), json!(self.arr));
        row.insert("Valuation".to_string(), json!(self.valuation));
        row.insert("Employees".to_string(), json!(self.employees));
        row.insert("Top Investors".to_string(), json!(self.top_investors));
        row.insert("Product".to_string(), json!(self.product));
        row.insert("G2 Rating".to_string(), json!(self.g2_rating));
        row
    }
}

/// Counts occurrences, most frequent first; ties keep first-seen order.
fn count_rows(values: impl Iterator<Item = String>, limit: usize) -> Vec<Row> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order
        .into_iter()
        .take(limit)
        .map(|name| {
            let count = counts[&name];
            let mut row = Row::new();
            row.insert("name".to_string(), Value::String(name));
            row.insert("value".to_string(), json!(count));
            row
        })
        .collect()
}

/// Converts `$500M`, `$3.5B` and friends to billions. `N/A` and junk yield `None`.
pub fn parse_currency(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }
    let cleaned = trimmed.replace(['$', ','], "");
    let amount = cleaned.split('(').next().unwrap_or_default().trim();
    let (digits, multiplier) = match amount.chars().last() {
        Some('T') => (&amount[..amount.len() - 1], 1000.0),
        Some('B') => (&amount[..amount.len() - 1], 1.0),
        Some('M') => (&amount[..amount.len() - 1], 0.001),
        Some('K') => (&amount[..amount.len() - 1], 0.000_001),
        _ => (amount, 1.0),
    };
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .map(|n| n * multiplier)
        .filter(|n| n.is_finite())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedInterpreter;

impl SimulatedInterpreter {
    pub fn new() -> Self {
        Self
    }
}

impl Interpreter for SimulatedInterpreter {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn interpret(&self, request: &InterpretRequest) -> Result<RawVisualization, InterpretError> {
        let query = request.query.trim().to_lowercase();
        if query.is_empty() {
            return Err(InterpretError::Status {
                code: 400,
                message: "Query is required".to_string(),
            });
        }

        if let Some(current) = &request.current_viz {
            if TWEAK_TOKENS.iter().any(|token| query.contains(token)) {
                return Ok(tweak(current.body().clone(), &query));
            }
        }

        let mut spec = RawVisualization {
            title: "Companies by Industry".to_string(),
            styling: Some(StyleDescriptor {
                color: Some(DEFAULT_SERIES_COLOR.to_string()),
                ..StyleDescriptor::default()
            }),
            ..RawVisualization::new(ChartKind::Bar)
        };
        let mut data_query = DataQuery::GroupBy {
            column: "Industry",
            limit: GROUP_LIMIT,
        };

        let mentions = |words: &[&str]| words.iter().any(|word| query.contains(word));
        if mentions(&["pie", "breakdown", "distribution"]) && query.contains("industry") {
            spec.kind = ChartKind::Pie;
            spec.title = "Industry Breakdown".to_string();
        } else if query.contains("scatter") && query.contains("valuation") && query.contains("founded") {
            spec.kind = ChartKind::Scatter;
            spec.title = "Founded Year vs Valuation".to_string();
            spec.styling = Some(StyleDescriptor {
                color: Some("#82ca9d".to_string()),
                x_label: Some("Founded Year".to_string()),
                y_label: Some("Valuation ($B)".to_string()),
                ..StyleDescriptor::default()
            });
            data_query = DataQuery::Raw {
                x_column: "Founded Year",
                y_column: "Valuation",
            };
        } else if query.contains("investor") && mentions(&["frequent", "most", "table"]) {
            spec.kind = ChartKind::Table;
            spec.title = "Most Frequent Investors".to_string();
            data_query = DataQuery::Frequency {
                column: "Top Investors",
                limit: GROUP_LIMIT,
            };
        } else if query.contains("arr") && query.contains("valuation") {
            spec.kind = ChartKind::Scatter;
            spec.title = "ARR vs Valuation Correlation".to_string();
            data_query = DataQuery::Raw {
                x_column: "ARR",
                y_column: "Valuation",
            };
        }

        spec.data = data_query.execute();
        spec.extra.insert("data_query".to_string(), data_query.to_value());
        tracing::debug!(kind = spec.kind.token(), rows = spec.data.len(), "simulated interpretation");
        Ok(spec)
    }

    fn health(&self) -> Result<HealthReport, InterpretError> {
        Ok(HealthReport {
            status: "healthy".to_string(),
            dataset_loaded: true,
            rows: COMPANIES.len() as u64,
        })
    }

    fn dataset_info(&self) -> Result<DatasetInfo, InterpretError> {
        Ok(DatasetInfo {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            shape: DatasetShape {
                rows: COMPANIES.len() as u64,
                columns: COLUMNS.len() as u64,
            },
            sample: COMPANIES.iter().take(SAMPLE_ROWS).map(Company::to_row).collect(),
        })
    }
}

static COLOR_PATTERNS: OnceLock<Vec<(Regex, (&'static str, &'static str))>> = OnceLock::new();

/// One whole-word matcher per color name, so "ordered" never reads as red.
fn color_patterns() -> &'static [(Regex, (&'static str, &'static str))] {
    COLOR_PATTERNS.get_or_init(|| {
        COLOR_TABLE
            .iter()
            .filter_map(|&(name, code)| {
                let pattern = format!(r"\b{}\b", regex::escape(name).replace(' ', r"\s+"));
                Regex::new(&pattern).ok().map(|re| (re, (name, code)))
            })
            .collect()
    })
}

/// Restyles the visualization under discussion; data and bindings are kept.
fn tweak(mut spec: RawVisualization, query: &str) -> RawVisualization {
    let styling = spec.styling.get_or_insert_with(StyleDescriptor::default);

    let named = color_patterns()
        .iter()
        .filter(|(pattern, _)| pattern.is_match(query))
        .max_by_key(|(_, (name, _))| name.len());
    if let Some((_, (_, code))) = named {
        styling.color = Some(code.to_string());
    }
    if query.contains("bold") && query.contains("header") {
        styling.bold_header = Some(true);
    }
    spec
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use viz_core::SessionState;

    use super::*;

    fn ask(query: &str) -> RawVisualization {
        SimulatedInterpreter::new()
            .interpret(&InterpretRequest::new(query, None))
            .expect("interpret")
    }

    #[test]
    fn industry_breakdown_is_a_pie_counted_by_industry() {
        let spec = ask("Create a pie chart representing industry breakdown");

        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.title, "Industry Breakdown");
        let first = &spec.data[0];
        assert_eq!(first.get("name"), Some(&json!("Fintech")));
        assert_eq!(first.get("value"), Some(&json!(3)));
        let total: u64 = spec
            .data
            .iter()
            .filter_map(|row| row.get("value").and_then(Value::as_u64))
            .sum();
        assert_eq!(total, COMPANIES.len() as u64);
        assert_eq!(spec.extra["data_query"]["operation"], "group_by");
    }

    #[test]
    fn founded_versus_valuation_is_a_labelled_scatter() {
        let spec = ask("Create a scatter plot of founded year and valuation");

        assert_eq!(spec.kind, ChartKind::Scatter);
        let styling = spec.styling.clone().expect("styling");
        assert_eq!(styling.x_label.as_deref(), Some("Founded Year"));
        assert_eq!(styling.y_label.as_deref(), Some("Valuation ($B)"));
        // The N/A valuation row is dropped.
        assert_eq!(spec.data.len(), COMPANIES.len() - 1);
        assert_eq!(spec.data[0].get("x"), Some(&json!(2012.0)));
        assert_eq!(spec.data[0].get("y"), Some(&json!(9.5)));
    }

    #[test]
    fn frequent_investors_is_a_table_of_split_names() {
        let spec = ask("Create a table to see which investors appear most frequently");

        assert_eq!(spec.kind, ChartKind::Table);
        assert_eq!(spec.title, "Most Frequent Investors");
        assert_eq!(spec.data[0].get("name"), Some(&json!("Sequoia")));
        assert_eq!(spec.data[0].get("value"), Some(&json!(5)));
        assert_eq!(spec.data[1].get("name"), Some(&json!("Accel")));
        assert_eq!(
            spec.data[0].keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["name", "value"]
        );
    }

    #[test]
    fn arr_and_valuation_is_a_correlation_scatter() {
        let spec = ask(
            "Give me the best representation of data if I want to understand the correlation of ARR and Valuation",
        );
        assert_eq!(spec.kind, ChartKind::Scatter);
        assert_eq!(spec.title, "ARR vs Valuation Correlation");
        let x = spec.data[0].get("x").and_then(Value::as_f64).expect("x");
        assert!((x - 0.45).abs() < 1e-9);
    }

    #[test]
    fn anything_else_falls_back_to_industry_bar() {
        let spec = ask("show me something interesting");
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.title, "Companies by Industry");
        assert_eq!(
            spec.styling.and_then(|s| s.color).as_deref(),
            Some(DEFAULT_SERIES_COLOR)
        );
    }

    #[test]
    fn tweak_restyles_current_visualization() {
        let mut session = SessionState::new();
        let pie = ask("pie chart of industry breakdown");
        let applied = session.apply_response("pie chart of industry breakdown", pie.clone());

        let tweaked = SimulatedInterpreter::new()
            .interpret(&InterpretRequest::for_session(
                &session,
                "Change the color of the chart to light blue and bold the header",
            ))
            .expect("interpret");

        assert_eq!(tweaked.kind, ChartKind::Pie);
        assert_eq!(tweaked.title, pie.title);
        assert_eq!(tweaked.data, pie.data);
        let styling = tweaked.styling.expect("styling");
        assert_eq!(styling.color.as_deref(), Some("#82CAFF"));
        assert_eq!(styling.bold_header, Some(true));
        assert!(!tweaked.extra.contains_key("id"));
        assert!(session.get(applied.id).is_some());
    }

    #[test]
    fn color_names_only_match_whole_words() {
        let mut session = SessionState::new();
        session.apply_response("bar chart", ask("bar chart of companies by industry"));
        let tweak = |query: &str| {
            SimulatedInterpreter::new()
                .interpret(&InterpretRequest::for_session(&session, query))
                .expect("interpret")
                .styling
                .and_then(|styling| styling.color)
        };

        assert_eq!(tweak("make the bars ordered"), Some(DEFAULT_SERIES_COLOR.to_string()));
        assert_eq!(tweak("update the rendered chart"), Some(DEFAULT_SERIES_COLOR.to_string()));
        assert_eq!(tweak("make it red"), Some("#FF8042".to_string()));
        assert_eq!(tweak("change it to dark blue"), Some("#00008B".to_string()));
    }

    #[test]
    fn tweak_words_without_context_build_a_new_chart() {
        let spec = ask("make a pie chart of industry distribution");
        assert_eq!(spec.kind, ChartKind::Pie);
    }

    #[test]
    fn empty_query_is_rejected() {
        let err = SimulatedInterpreter::new()
            .interpret(&InterpretRequest::new("  ", None))
            .expect_err("rejected");
        assert_eq!(
            err,
            InterpretError::Status {
                code: 400,
                message: "Query is required".to_string(),
            }
        );
    }

    #[test]
    fn currency_strings_convert_to_billions() {
        let cases = [
            ("$3.5B", 3.5),
            ("$500M", 0.5),
            ("$1.4T", 1400.0),
            ("$1.2B (2023)", 1.2),
            ("$2,000K", 0.002),
        ];
        for (text, expected) in cases {
            let parsed = parse_currency(text).expect(text);
            assert!((parsed - expected).abs() < 1e-9, "{text} parsed as {parsed}");
        }
        assert_eq!(parse_currency("N/A"), None);
        assert_eq!(parse_currency("unknown"), None);
    }

    #[test]
    fn dataset_info_describes_builtin_table() {
        let info = SimulatedInterpreter::new().dataset_info().expect("info");
        assert_eq!(info.shape, DatasetShape { rows: 12, columns: 11 });
        assert_eq!(info.sample.len(), 3);
        assert_eq!(
            info.sample[0].keys().map(String::as_str).collect::<Vec<_>>(),
            COLUMNS.to_vec()
        );
    }
}
