use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use shared::product::{Category, Id, Product, Supermarket};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const PER_PAGE: usize = 10;

const STORES: [(&str, &str); 3] =
    [("lidl", "Lidl"), ("kaufland", "Kaufland"), ("billa", "Billa")];
const CATEGORIES: [&str; 3] = ["DAIRY", "BAKERY", "DRINKS"];

/// In-memory stand-in for the upstream `/products` endpoint: filters,
/// paginates and rejects requests without the test bearer token.
#[derive(Clone, Debug)]
pub struct ProductCatalog {
    products: Vec<Product>,
    per_page: usize,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>, per_page: usize) -> Self {
        Self {
            products,
            per_page: per_page.max(1),
        }
    }

    /// `count` products named `Product {id}`, spread over three stores and
    /// three categories, priced `id % 90 + 1` euro.
    pub fn fake(count: u64) -> Self {
        let products = (1..=count)
            .map(|id| {
                let (slug, name) = STORES[id as usize % STORES.len()];
                let mut product = Product::fake(id);
                product.name = format!("Product {}", id);
                product.category =
                    Some(CATEGORIES[id as usize % CATEGORIES.len()].to_string());
                product.price_eur = (id % 90 + 1) as f64;
                product.supermarket = Supermarket {
                    id: Id::from(id % STORES.len() as u64 + 1),
                    name: name.to_string(),
                    slug: slug.to_string(),
                    logo: None,
                };
                product
            })
            .collect();

        Self::new(products, PER_PAGE)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut counts = BTreeMap::<String, u64>::new();
        for category in self.products.iter().filter_map(|p| p.category.clone())
        {
            *counts.entry(category).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, products_count)| Category {
                name,
                products_count,
            })
            .collect()
    }

    pub fn supermarkets(&self) -> Vec<Supermarket> {
        let mut supermarkets = BTreeMap::<String, Supermarket>::new();
        for product in &self.products {
            supermarkets
                .entry(product.supermarket.slug.clone())
                .or_insert_with(|| product.supermarket.clone());
        }
        supermarkets.into_values().collect()
    }

    pub fn matching(&self, params: &HashMap<String, String>) -> Vec<&Product> {
        let search = params.get("search").map(|s| s.to_lowercase());
        let min_price = params
            .get("min_price")
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(f64::MIN);
        let max_price = params
            .get("max_price")
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(f64::MAX);

        self.products
            .iter()
            .filter(|product| {
                search.as_ref().map_or(true, |search| {
                    product.name.to_lowercase().contains(search)
                })
            })
            .filter(|product| {
                params
                    .get("supermarket")
                    .map_or(true, |slug| product.supermarket.slug == *slug)
            })
            .filter(|product| {
                params
                    .get("category")
                    .map_or(true, |name| product.category.as_ref() == Some(name))
            })
            .filter(|product| {
                product.price_eur >= min_price && product.price_eur <= max_price
            })
            .collect()
    }
}

impl Respond for ProductCatalog {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !is_authorized(request) {
            return ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Unauthenticated." }));
        }

        let params: HashMap<String, String> =
            request.url.query_pairs().into_owned().collect();

        if let Some(id) = params.get("id") {
            return match self.products.iter().find(|p| p.id.0 == *id) {
                Some(product) => ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": product })),
                None => ResponseTemplate::new(404)
                    .set_body_json(json!({ "message": "Product not found" })),
            };
        }

        let matching = self.matching(&params);
        let total = matching.len();
        let total_pages = total.div_ceil(self.per_page);
        let page = params
            .get("page")
            .and_then(|page| page.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        let data: Vec<&Product> = matching
            .into_iter()
            .skip((page - 1) * self.per_page)
            .take(self.per_page)
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "meta": { "total": total, "total_pages": total_pages }
        }))
    }
}

fn is_authorized(request: &Request) -> bool {
    let expected = format!("Bearer {}", TEST_API_KEY);
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str())
}

/// Mock upstream product API serving a [`ProductCatalog`].
pub struct TestUpstream {
    server: MockServer,
    catalog: ProductCatalog,
}

impl TestUpstream {
    pub async fn start(catalog: ProductCatalog) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(catalog.clone())
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": catalog.categories() })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/supermarkets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": catalog.supermarkets() })),
            )
            .mount(&server)
            .await;

        Self { server, catalog }
    }

    pub fn base_url(&self) -> String {
        format!("{}/", self.server.uri())
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
