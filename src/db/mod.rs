pub mod aggregate;
pub mod catalog;
pub(crate) mod join;
pub mod table;
