//! Data table component types.
//!
//! These types describe the reusable list tables in the admin panel: the
//! header columns, the search box, the per-page choices and the empty state.

use shopfront_core::pagination::ADMIN_PER_PAGE_OPTIONS;

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Right-align (prices, counts).
    pub numeric: bool,
}

impl TableColumn {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            numeric: false,
        }
    }

    #[must_use]
    pub fn numeric(key: &str, label: &str) -> Self {
        Self {
            numeric: true,
            ..Self::new(key, label)
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Unique table identifier, also the HTMX swap target id.
    pub table_id: String,
    pub columns: Vec<TableColumn>,
    pub search_placeholder: String,
    /// Page sizes offered; empty for a fixed page size.
    pub per_page_options: Vec<u32>,
    pub empty_title: String,
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            search_placeholder: "Search...".to_string(),
            per_page_options: vec![],
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Offer a page-size selector.
    #[must_use]
    pub fn per_page_options(mut self, options: &[u32]) -> Self {
        self.per_page_options = options.to_vec();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Columns plus the trailing actions column.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }
}

/// Build the products table configuration.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("products-table")
        .column(TableColumn::numeric("id", "#"))
        .column(TableColumn::new("image", "Image"))
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::numeric("price", "Price"))
        .search_placeholder("Search by name...")
        .per_page_options(&ADMIN_PER_PAGE_OPTIONS)
        .empty_state(
            "No products yet",
            Some("Try adjusting your search or price range"),
        )
}

/// Build the users table configuration.
#[must_use]
pub fn users_table_config() -> DataTableConfig {
    DataTableConfig::new("users-table")
        .column(TableColumn::numeric("id", "#"))
        .column(TableColumn::new("name", "Name"))
        .column(TableColumn::new("email", "Email"))
        .search_placeholder("Search by name or email...")
        .empty_state("No users found", None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_table_offers_page_sizes() {
        let config = products_table_config();
        assert_eq!(config.per_page_options, vec![6, 9, 12]);
        assert_eq!(config.column_count(), 5);
    }

    #[test]
    fn test_users_table_has_fixed_page_size() {
        assert!(users_table_config().per_page_options.is_empty());
    }
}
