//! List and ranking query language.
//!
//! This module provides:
//! - registry: client column ids and where they are stored
//! - parser: tolerant decoding of raw request parameters
//! - compiler: typed conditions and orderings from parsed descriptors
//! - StatsQueryBuilder: SeaQuery-based SQL generation

pub mod compiler;
pub mod parser;
pub mod registry;
mod sql;
pub mod types;

pub use compiler::{
    CompiledFilter, CompiledOrdering, CompiledQuery, Condition, OrderTerm, compile,
    compile_filters, compile_sorts,
};
pub use parser::RawListParams;
pub use sql::{StatsQueryBuilder, condition_expr, escape_like_wildcards};
pub use types::{
    Aggregate, EntityKind, FilterDescriptor, FilterValue, ListRequest, PageResult, Pagination,
    SortDescriptor, SortDirection, SortTarget, StorageRef,
};
