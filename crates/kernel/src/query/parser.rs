//! Descriptor parser for the loosely-typed wire format.
//!
//! Filters and sorting arrive as JSON-encoded query-string values. Nothing
//! here fails a request: malformed input decodes to an empty list or to the
//! default pagination, and entries that carry no usable value are dropped.

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{
    DEFAULT_TAKE, FilterDescriptor, FilterValue, ListRequest, Pagination, SortDescriptor,
};

/// Raw list parameters exactly as they appear in the query string.
#[derive(Debug, Clone, Default)]
pub struct RawListParams {
    pub filters: Option<String>,
    pub sorting: Option<String>,
    pub take: Option<String>,
    pub skip: Option<String>,
    pub search: Option<String>,
}

impl RawListParams {
    /// Collect list parameters from decoded query-string pairs.
    ///
    /// A repeated key keeps its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "filters" => &mut params.filters,
                "sorting" => &mut params.sorting,
                "take" => &mut params.take,
                "skip" => &mut params.skip,
                "search" => &mut params.search,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            } else {
                debug!(param = %key, "ignoring repeated query parameter");
            }
        }
        params
    }

    /// Decode into a [`ListRequest`], capping `take` at `max_take`.
    pub fn into_request(self, max_take: u64) -> ListRequest {
        ListRequest {
            filters: parse_filters(self.filters.as_deref()),
            sorting: parse_sorting(self.sorting.as_deref()),
            page: Pagination {
                take: parse_take(self.take.as_deref(), max_take),
                skip: parse_skip(self.skip.as_deref()),
            },
            search: parse_search(self.search.as_deref()),
        }
    }
}

/// Decode the `filters` parameter: `[{"id": ..., "value": ...}, ...]`.
pub fn parse_filters(raw: Option<&str>) -> Vec<FilterDescriptor> {
    decode_list(raw, "filters")
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let value = filter_value(entry.get("value")?)?;
            Some(FilterDescriptor {
                id: id.to_string(),
                value,
            })
        })
        .collect()
}

/// Decode the `sorting` parameter: `[{"id": ..., "desc": bool}, ...]`.
pub fn parse_sorting(raw: Option<&str>) -> Vec<SortDescriptor> {
    decode_list(raw, "sorting")
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let descending = entry.get("desc").and_then(Value::as_bool).unwrap_or(false);
            Some(SortDescriptor::new(id, descending))
        })
        .collect()
}

/// Page size: default when absent, non-numeric or below one; capped at `max_take`.
pub fn parse_take(raw: Option<&str>, max_take: u64) -> u64 {
    let take = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.unsigned_abs())
        .unwrap_or(DEFAULT_TAKE);

    if take > max_take {
        warn!(requested = take, capped = max_take, "take exceeds maximum, capping");
        max_take
    } else {
        take
    }
}

/// Offset: zero when absent, non-numeric or negative.
pub fn parse_skip(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.unsigned_abs())
        .unwrap_or(0)
}

/// Search term, trimmed; blank means no search.
pub fn parse_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_list(raw: Option<&str>, param: &'static str) -> Vec<Value> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(param, error = %e, "ignoring malformed descriptor list");
            Vec::new()
        }
    }
}

/// Map a raw JSON value onto a [`FilterValue`].
///
/// Falsy values (`null`, `""`, `false`, `0`, `[]`) mean "no filter" and
/// yield `None`.
fn filter_value(value: &Value) -> Option<FilterValue> {
    match value {
        Value::String(s) if !s.is_empty() => Some(FilterValue::Text(s.clone())),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(FilterValue::Text(n.to_string())),
        Value::Bool(true) => Some(FilterValue::Text("true".to_string())),
        Value::Array(items) if !items.is_empty() => {
            let bound = |i: usize| {
                items
                    .get(i)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            Some(FilterValue::Range(bound(0), bound(1)))
        }
        _ => None,
    }
}
