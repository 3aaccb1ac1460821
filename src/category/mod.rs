//! Categories for grouping incomes and expenses.

mod db;
mod domain;
mod endpoints;

pub use db::{create_category, create_category_table, get_categories};
pub use domain::{Category, CategoryLabel, CategoryType};
pub use endpoints::{create_category_endpoint, list_categories_endpoint};
