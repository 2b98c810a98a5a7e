use std::sync::OnceLock;

use regex::Regex;
use regex::RegexBuilder;
use serde::Deserialize;
use serde::Serialize;

/// Words that mark a request as a modification of an existing visualization.
pub const TWEAK_TOKENS: [&str; 5] = ["change", "make", "color", "bold", "update"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    New,
    Tweak,
}

impl Disposition {
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Tweak => "tweak",
        }
    }
}

static TWEAK_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tweak_pattern() -> &'static Regex {
    TWEAK_PATTERN.get_or_init(|| {
        let alternation = TWEAK_TOKENS
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .expect("tweak token alternation is a valid pattern")
    })
}

/// Keyword heuristic: any token occurring anywhere in the text means `Tweak`.
///
/// Substring matches count, so "remake" and "colorful" classify as tweaks.
pub fn classify(query: &str) -> Disposition {
    if tweak_pattern().is_match(query) {
        Disposition::Tweak
    } else {
        Disposition::New
    }
}
