use std::fmt::Write;

use shared::pagination::{has_next, has_previous};
use shared::product::{Category, Product, Supermarket};
use shared::session::{ListingPage, ListingView};

pub const PRODUCT_NOT_FOUND: &str = "Product not found";

pub fn listing(view: &ListingView) -> String {
    match view {
        ListingView::Loading => "Loading…".to_string(),
        ListingView::Failed { message } => message.clone(),
        ListingView::Empty { message } => {
            format!("{}\n{}", products_found(0), message)
        }
        ListingView::Loaded(page) => loaded(page),
    }
}

fn loaded(page: &ListingPage) -> String {
    let mut out = products_found(page.total);
    for product in &page.products {
        let _ = write!(out, "\n  {}", product_line(product));
    }

    if let Some(pagination) = &page.pagination {
        let previous = if has_previous(page.page) { "‹" } else { " " };
        let next = if has_next(page.page, page.total_pages) {
            "›"
        } else {
            " "
        };
        let _ = write!(
            out,
            "\n\n{} {} {}",
            previous,
            pagination.render(page.page),
            next
        );
    }

    out
}

fn products_found(total: u64) -> String {
    let plural = if total == 1 { "" } else { "s" };
    format!("{} product{} found", total, plural)
}

fn product_line(product: &Product) -> String {
    let mut line =
        format!("#{} {} €{:.2}", product.id, product.name, product.price_eur);
    if let Some(old_price) = product.old_price_eur {
        let _ = write!(line, " (was €{:.2})", old_price);
    }
    if let Some(discount) = &product.discount {
        let _ = write!(line, " -{}%", discount);
    }
    let _ = write!(line, " @ {}", product.supermarket.name);
    line
}

pub fn product_detail(product: Option<&Product>) -> String {
    let Some(product) = product else {
        return PRODUCT_NOT_FOUND.to_string();
    };

    let mut out = product.name.clone();
    if let Some(description) = &product.description {
        let _ = write!(out, "\n{}", description);
    }
    let _ = write!(out, "\n\nPrice: €{:.2}", product.price_eur);
    if let Some(old_price) = product.old_price_eur {
        let _ = write!(out, " (was €{:.2})", old_price);
    }
    if let (Some(savings), Some(discount)) =
        (product.savings_eur(), &product.discount)
    {
        let _ = write!(out, "\nYou save €{:.2} ({}% off)", savings, discount);
    }
    let _ = write!(out, "\nAvailable at: {}", product.supermarket.name);
    if let Some(category) = &product.category {
        let _ = write!(out, "\nCategory: {}", category);
    }
    let _ = write!(out, "\nValid period: {}", product.brochure.validity());

    out
}

pub fn categories(categories: &[Category]) -> String {
    let mut out = "All categories".to_string();
    for category in categories {
        let _ = write!(
            out,
            "\n  {} ({})",
            category.display_name(),
            category.products_count
        );
    }
    out
}

pub fn supermarkets(supermarkets: &[Supermarket]) -> String {
    supermarkets
        .iter()
        .map(|supermarket| format!("{}  {}", supermarket.slug, supermarket.name))
        .collect::<Vec<String>>()
        .join("\n")
}
