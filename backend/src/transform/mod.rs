//! Tower conversion.
//!
//! - Normalize: raw tower labels to `Tower-` keys
//! - Aggregate: flat rows to tower → floor → companies
//! - Builder: aggregation table to output document
//! - Pipeline: validation gate plus the logged entry points

pub mod aggregate;
pub mod builder;
pub mod normalize;
pub mod pipeline;

pub use aggregate::{aggregate, aggregate_with, split_companies, AggregationTable, CompanySet};
pub use builder::build;
pub use normalize::{normalize, TOWER_PREFIX};
pub use pipeline::{convert, ConvertOptions};
