pub mod config;

pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod shell;
pub(crate) mod storage;

pub use common::error::DatabaseError;
pub use config::StoreConfig;
pub use crate::core::types::Value;
pub use db::{
    aggregate::AggregateOp,
    catalog::{Catalog, QueryResponse},
    table::*,
};
