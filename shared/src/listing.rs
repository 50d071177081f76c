use serde::Serialize;
use thiserror::Error;

pub const PRICE_FLOOR: u32 = 0;
pub const PRICE_CEILING: u32 = 100;
pub const DEFAULT_MIN_PRICE: u32 = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("Invalid price range {min}-{max}, expected 0 <= min <= max <= 100")]
    InvalidPriceRange { min: u32, max: u32 },
    #[error("Invalid page {0}, pages start at 1")]
    InvalidPage(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl PriceRange {
    pub fn new(min: u32, max: u32) -> Result<Self, ListingError> {
        if min > max || max > PRICE_CEILING {
            return Err(ListingError::InvalidPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether the range excludes part of `DEFAULT_MIN_PRICE..=PRICE_CEILING`.
    /// A floor of 0 is not narrower than the default.
    pub fn is_narrowed(&self) -> bool {
        self.min > DEFAULT_MIN_PRICE || self.max < PRICE_CEILING
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PRICE,
            max: PRICE_CEILING,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilters {
    pub search_text: Option<String>,
    pub store_slug: Option<String>,
    pub category_name: Option<String>,
    pub price_range: PriceRange,
}

/// Identity of one product listing request. Two equal queries are the same
/// logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub supermarket: Option<String>,
    pub category: Option<String>,
    pub price_range: PriceRange,
    pub page: u64,
}

impl ListingQuery {
    /// Query parameters understood by the upstream `/products` endpoint.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(supermarket) = &self.supermarket {
            params.push(("supermarket", supermarket.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params.push(("min_price", self.price_range.min.to_string()));
        params.push(("max_price", self.price_range.max.to_string()));
        params.push(("page", self.page.to_string()));
        params
    }

    /// Equal apart from the page.
    pub fn same_filters(&self, other: &ListingQuery) -> bool {
        self.search == other.search
            && self.supermarket == other.supermarket
            && self.category == other.category
            && self.price_range == other.price_range
    }
}

impl Default for ListingQuery {
    fn default() -> Self {
        ListingQueryState::new().query()
    }
}

/// Search, filters and current page of a product listing.
///
/// Any change to the settled search text, store, category or price range
/// moves the listing back to page 1. Setters return whether the value
/// actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQueryState {
    search_input: String,
    filters: ListingFilters,
    page: u64,
}

impl Default for ListingQueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingQueryState {
    pub fn new() -> Self {
        Self {
            search_input: String::new(),
            filters: ListingFilters::default(),
            page: 1,
        }
    }

    pub fn filters(&self) -> &ListingFilters {
        &self.filters
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Search text as typed, before debouncing.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Records a keystroke. The query only sees the text once it is passed
    /// to [`Self::apply_debounced_search`].
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
    }

    pub fn apply_debounced_search(&mut self, text: &str) -> bool {
        let search_text = non_empty(text);
        self.replace_filter(|filters| &mut filters.search_text, search_text)
    }

    pub fn set_store(&mut self, slug: &str) -> bool {
        let store_slug = non_empty(slug);
        self.replace_filter(|filters| &mut filters.store_slug, store_slug)
    }

    pub fn set_category(&mut self, name: &str) -> bool {
        let category_name = non_empty(name);
        self.replace_filter(|filters| &mut filters.category_name, category_name)
    }

    pub fn set_price_range(&mut self, price_range: PriceRange) -> bool {
        self.replace_filter(|filters| &mut filters.price_range, price_range)
    }

    /// Clears store and category and restores the default price range.
    /// The search text is kept.
    pub fn reset_filters(&mut self) -> bool {
        let store = self.set_store("");
        let category = self.set_category("");
        let price = self.set_price_range(PriceRange::default());
        store || category || price
    }

    pub fn set_page(&mut self, page: u64) -> Result<bool, ListingError> {
        if page == 0 {
            return Err(ListingError::InvalidPage(page));
        }
        let changed = self.page != page;
        self.page = page;
        Ok(changed)
    }

    pub fn next_page(&mut self, total_pages: u64) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn active_filters_count(&self) -> usize {
        [
            self.filters.store_slug.is_some(),
            self.filters.category_name.is_some(),
            self.filters.price_range.is_narrowed(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filters_count() > 0
    }

    pub fn query(&self) -> ListingQuery {
        ListingQuery {
            search: self.filters.search_text.clone(),
            supermarket: self.filters.store_slug.clone(),
            category: self.filters.category_name.clone(),
            price_range: self.filters.price_range,
            page: self.page,
        }
    }

    fn replace_filter<T: PartialEq>(
        &mut self,
        field: impl FnOnce(&mut ListingFilters) -> &mut T,
        value: T,
    ) -> bool {
        let current = field(&mut self.filters);
        if *current == value {
            return false;
        }
        *current = value;
        self.page = 1;
        true
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
