//! Solr query compilation for lucent.
//!
//! This crate turns the abstract query model of `lucent-query` into Solr query syntax:
//! - Field naming: abstract field ids to dynamic backend field names
//! - Condition compilation: condition trees to tagged filter queries
//! - Key flattening: fulltext keys to boolean queries over language-specific fields
//! - Request assembly: a whole search query to request parameters
//!
//! # Example
//!
//! ```
//! use lucent_index::{FieldDescriptor, Schema, compile_conditions};
//! use lucent_query::{Condition, ConditionGroup, DataType};
//!
//! let schema = Schema::new().with_field(FieldDescriptor::new("status", DataType::String));
//! let group = ConditionGroup::and().condition(Condition::eq("status", "published"));
//!
//! let fragments = compile_conditions(&group, &schema, &[]).unwrap();
//! assert_eq!(fragments[0].query, "ss_status:\"published\"");
//! ```

#![warn(missing_docs)]

mod assemble;
pub mod compile;
mod error;
pub mod escape;
pub mod mapper;
mod schema;
mod site;
mod spatial;

pub use assemble::{
    Facet, FacetOperator, Grouping, MATCH_ALL, QueryAssembler, SearchQuery, SearchRequest, Sort,
    SortOrder,
};
pub use compile::{
    ConditionCompiler, DEFAULT_SUFFIX, FilterFragment, KeyFlattener, TargetField,
    compile_conditions, compile_keys, reduce,
};
pub use error::CompileError;
pub use mapper::{FieldNameMapper, decode_name, encode_name, field_name, special, type_prefix};
pub use schema::{FieldDescriptor, IndexScope, Schema, SchemaProvider};
pub use site::{SITE_HASH_LEN, site_hash};
pub use spatial::{GeofiltSpatial, LocationFilter, SkipSpatial, SpatialQueries, geofilt};
