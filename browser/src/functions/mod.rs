pub mod interactive;
pub mod list_filters;
pub mod list_products;
pub mod show_product;
