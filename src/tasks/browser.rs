//! Browser instruction interpreter.
//!
//! Classifies a free-text instruction into a navigation/search intent. No
//! browser is driven from here; the result is a description of the intent.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::info;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r#"https?://[^\s"']+"#).unwrap();
    static ref SEARCH_PATTERN: Regex = Regex::new(r#"(?i)search for ["']([^"']+)["']"#).unwrap();
}

/// What a browser instruction asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserIntent {
    SearchOnSite { query: String, url: String },
    Navigate { url: String },
    Search { query: String },
    Unrecognized,
}

impl BrowserIntent {
    pub fn classify(instruction: &str) -> Self {
        let url = URL_PATTERN
            .find(instruction)
            .map(|m| m.as_str().to_string());
        let query = SEARCH_PATTERN
            .captures(instruction)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        match (url, query) {
            (Some(url), Some(query)) => BrowserIntent::SearchOnSite { query, url },
            (Some(url), None) => BrowserIntent::Navigate { url },
            (None, Some(query)) => BrowserIntent::Search { query },
            (None, None) => BrowserIntent::Unrecognized,
        }
    }
}

impl fmt::Display for BrowserIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserIntent::SearchOnSite { query, url } => {
                write!(f, "Searched for '{}' on {}", query, url)
            }
            BrowserIntent::Navigate { url } => write!(f, "Navigated to {}", url),
            BrowserIntent::Search { query } => write!(f, "Searched for '{}'", query),
            BrowserIntent::Unrecognized => {
                write!(f, "No specific browser action detected in instruction")
            }
        }
    }
}

/// Interpret a browser instruction and describe what was done.
pub fn interpret(instruction: &str) -> String {
    info!("Handling browser instruction: {}", instruction);
    let intent = BrowserIntent::classify(instruction);
    match &intent {
        BrowserIntent::SearchOnSite { query, url } => info!("Searching for '{}' on {}", query, url),
        BrowserIntent::Navigate { url } => info!("Navigating to {}", url),
        BrowserIntent::Search { query } => info!("Searching for '{}'", query),
        BrowserIntent::Unrecognized => {}
    }
    intent.to_string()
}
