//! Normalisation of search service payloads.
//!
//! The upstream service has shipped several response shapes over time: an
//! object wrapping a `results` array, a bare array, and occasionally
//! something else entirely. The adapter accepts all of them and degrades to
//! an empty result list rather than failing a search the caller has already
//! been charged nothing for.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::SearchResult;
use crate::domain::ports::SearchResponse;

/// Title substituted when the upstream omits one.
const FALLBACK_TITLE: &str = "Fatwa";
/// Link substituted when the upstream omits one.
const FALLBACK_URL: &str = "#";

#[derive(Debug, Deserialize)]
pub(super) struct RawSearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RawSearchResult {
    fn into_domain(self) -> SearchResult {
        SearchResult {
            title: self
                .title
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| FALLBACK_TITLE.to_owned()),
            url: self
                .url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| FALLBACK_URL.to_owned()),
        }
    }
}

fn parse_items(items: Vec<Value>) -> Vec<SearchResult> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawSearchResult>(item) {
            Ok(raw) => Some(raw.into_domain()),
            Err(err) => {
                warn!(error = %err, "skipping malformed search result item");
                None
            }
        })
        .collect()
}

/// Normalise whatever the upstream sent into a [`SearchResponse`].
pub(super) fn normalise_payload(payload: Value) -> SearchResponse {
    match payload {
        Value::Object(mut map) => {
            let query = map
                .get("query")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let processing_time = map.get("processing_time").and_then(Value::as_f64);
            let results = match map.remove("results") {
                Some(Value::Array(items)) => parse_items(items),
                Some(other) => {
                    warn!(
                        kind = json_kind(&other),
                        "search payload carried a non-array results field"
                    );
                    Vec::new()
                }
                None => {
                    warn!("search payload carried no results field");
                    Vec::new()
                }
            };
            SearchResponse {
                results,
                query,
                processing_time,
            }
        }
        Value::Array(items) => SearchResponse {
            results: parse_items(items),
            query: None,
            processing_time: None,
        },
        other => {
            warn!(kind = json_kind(&other), "unrecognised search payload shape");
            SearchResponse::default()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
