//! Predicate and sort compiler.
//!
//! Turns parsed descriptors into a [`CompiledQuery`]: a conjunction of typed
//! [`Condition`]s plus an ordering. Every condition carries its value as
//! data, never as SQL text, so each backend binds it as a parameter. One
//! compiled query feeds both the page query and the count query.

use chrono::{DateTime, NaiveDate, Utc};

use super::registry::{self, DEFAULT_GROUP_SENTINEL};
use super::types::{
    ColumnSpec, EntityKind, FilterDescriptor, FilterKind, FilterValue, ListRequest, Pagination,
    SortDescriptor, SortDirection, SortTarget, StorageRef,
};

/// An atomic, parameterized condition. All conditions are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Inclusive timestamp range.
    Between {
        column: StorageRef,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AtLeast {
        column: StorageRef,
        bound: DateTime<Utc>,
    },
    AtMost {
        column: StorageRef,
        bound: DateTime<Utc>,
    },
    /// Case-sensitive substring match. `needle` is unescaped.
    Contains { column: StorageRef, needle: String },
    Equals { column: StorageRef, value: bool },
    /// Text array column contains `element`.
    ArrayContains { column: StorageRef, element: String },
}

/// Conjunction produced by the predicate compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
    pub conditions: Vec<Condition>,
    /// A set-membership filter named the default group; no condition was added for it.
    pub is_default_group_sentinel: bool,
}

/// One ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub target: SortTarget,
    pub direction: SortDirection,
}

/// Ordering produced by the sort compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOrdering {
    /// Terms in priority order, always ending with the entity's tie-breaker.
    pub terms: Vec<OrderTerm>,
    /// At least one sort descriptor matched a sortable column.
    pub had_any_sort: bool,
}

/// Everything a backend needs to run a list or ranking query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub entity: EntityKind,
    pub filter: CompiledFilter,
    pub ordering: CompiledOrdering,
    pub page: Pagination,
    /// Restriction on the group's display identifier (ranking only).
    pub search: Option<String>,
}

/// Compile a parsed request for an entity.
pub fn compile(entity: EntityKind, request: &ListRequest) -> CompiledQuery {
    CompiledQuery {
        entity,
        filter: compile_filters(entity, &request.filters),
        ordering: compile_sorts(entity, &request.sorting),
        page: request.page,
        search: if entity.is_ranking() {
            request.search.clone()
        } else {
            None
        },
    }
}

/// Outcome of compiling one descriptor.
enum Compiled {
    Condition(Condition),
    DefaultGroup,
    Nothing,
}

/// Compile filter descriptors. Unknown ids and kind/shape mismatches are skipped.
pub fn compile_filters(entity: EntityKind, descriptors: &[FilterDescriptor]) -> CompiledFilter {
    let mut filter = CompiledFilter::default();

    for descriptor in descriptors {
        let Some(spec) = registry::filter_column(entity, &descriptor.id) else {
            continue;
        };
        match build_condition(spec, &descriptor.value) {
            Compiled::Condition(condition) => filter.conditions.push(condition),
            Compiled::DefaultGroup => filter.is_default_group_sentinel = true,
            Compiled::Nothing => {}
        }
    }

    filter
}

fn build_condition(spec: &ColumnSpec, value: &FilterValue) -> Compiled {
    match (spec.kind, value) {
        (FilterKind::DateRange, FilterValue::Range(start, end)) => {
            date_range(spec.storage, start.as_deref(), end.as_deref())
        }
        (FilterKind::EnumLike, FilterValue::Text(text)) => Compiled::Condition(Condition::Contains {
            column: spec.storage,
            needle: normalize_enum(text),
        }),
        (FilterKind::Boolean, FilterValue::Text(text)) => Compiled::Condition(Condition::Equals {
            column: spec.storage,
            value: text == "true",
        }),
        (FilterKind::StringContains, FilterValue::Text(text)) => {
            Compiled::Condition(Condition::Contains {
                column: spec.storage,
                needle: text.clone(),
            })
        }
        (FilterKind::SetMembership, FilterValue::Text(text)) => {
            if text.eq_ignore_ascii_case(DEFAULT_GROUP_SENTINEL) {
                Compiled::DefaultGroup
            } else {
                Compiled::Condition(Condition::ArrayContains {
                    column: spec.storage,
                    element: text.to_lowercase(),
                })
            }
        }
        _ => Compiled::Nothing,
    }
}

fn date_range(column: StorageRef, start: Option<&str>, end: Option<&str>) -> Compiled {
    let start = start.and_then(parse_bound);
    let end = end.and_then(parse_bound);
    let condition = match (start, end) {
        (Some(start), Some(end)) => Condition::Between { column, start, end },
        (Some(bound), None) => Condition::AtLeast { column, bound },
        (None, Some(bound)) => Condition::AtMost { column, bound },
        (None, None) => return Compiled::Nothing,
    };
    Compiled::Condition(condition)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// "point 45" → "POINT_45".
pub fn normalize_enum(value: &str) -> String {
    value.replace(' ', "_").to_uppercase()
}

/// Compile sort descriptors, falling back to the entity default.
///
/// The first descriptor for a given id wins; later duplicates are ignored.
pub fn compile_sorts(entity: EntityKind, descriptors: &[SortDescriptor]) -> CompiledOrdering {
    let mut terms: Vec<OrderTerm> = Vec::new();

    for descriptor in descriptors {
        let Some(column) = registry::sort_column(entity, &descriptor.id) else {
            continue;
        };
        if terms.iter().any(|term| term.target == column.target) {
            continue;
        }
        terms.push(OrderTerm {
            target: column.target,
            direction: descriptor.direction(),
        });
    }

    let had_any_sort = !terms.is_empty();
    if !had_any_sort {
        let (target, direction) = registry::default_ordering(entity);
        terms.push(OrderTerm { target, direction });
    }
    terms.push(OrderTerm {
        target: registry::tie_breaker(entity),
        direction: SortDirection::Asc,
    });

    CompiledOrdering {
        terms,
        had_any_sort,
    }
}
