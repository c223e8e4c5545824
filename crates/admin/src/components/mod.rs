//! Reusable view components for admin tables.

pub mod data_table;
pub mod pager;

pub use data_table::{DataTableConfig, TableColumn, products_table_config, users_table_config};
pub use pager::{PageLink, Pager};
