use std::fmt::Display;

use chrono::{DateTime, NaiveDate};
use fake::faker::company::en::{Buzzword, CompanyName};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier as sent by the upstream API, which uses both numbers and
/// strings for ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Id(id),
            RawId::Number(id) => Id(id.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brochure {
    pub id: Id,
    #[serde(default)]
    pub code: String,
    pub valid_from: String,
    pub valid_until: String,
}

impl Brochure {
    /// Validity window formatted as `YYYY-MM-DD - YYYY-MM-DD`. Dates the
    /// upstream sends in an unknown format are shown as received.
    pub fn validity(&self) -> String {
        format!(
            "{} - {}",
            display_date(&self.valid_from),
            display_date(&self.valid_until)
        )
    }
}

fn display_date(raw: &str) -> String {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return datetime.date_naive().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supermarket {
    pub id: Id,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub products_count: u64,
}

impl Category {
    /// Upper-cases the first character and lower-cases the rest.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_eur: f64,
    #[serde(default)]
    pub price_lev: Option<f64>,
    #[serde(default)]
    pub old_price_eur: Option<f64>,
    #[serde(default)]
    pub old_price_lev: Option<f64>,
    #[serde(default)]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub brochure: Brochure,
    pub supermarket: Supermarket,
}

/// Discount percentage; the upstream sends it either as a number or as a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Discount(pub String);

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Id::deserialize(deserializer).map(|Id(value)| Discount(value))
    }
}

impl Display for Discount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Product {
    /// Difference between the old and the current euro price, when the
    /// product is discounted.
    pub fn savings_eur(&self) -> Option<f64> {
        self.old_price_eur
            .map(|old_price| old_price - self.price_eur)
            .filter(|savings| *savings > 0.0)
    }

    pub fn fake(id: u64) -> Self {
        let price_eur = (50..10_000).fake::<u64>() as f64 / 100_f64;
        let discount = (5..60).fake::<u64>();
        let old_price_eur =
            (price_eur * 100_f64 / (100 - discount) as f64 * 100_f64).round()
                / 100_f64;
        let supermarket_name: String = CompanyName().fake();

        Self {
            id: Id::from(id),
            name: Buzzword().fake(),
            description: Some(Sentence(3..8).fake()),
            price_eur,
            price_lev: Some((price_eur * 1.95583 * 100_f64).round() / 100_f64),
            old_price_eur: Some(old_price_eur),
            old_price_lev: None,
            discount: Some(Discount(discount.to_string())),
            category: Some(Buzzword().fake()),
            image_url: Some("https://picsum.photos/200/300".to_string()),
            brochure: Brochure {
                id: Id::from((1..500).fake::<u64>()),
                code: format!("BR-{}", (1000..9999).fake::<u64>()),
                valid_from: "2025-01-06".to_string(),
                valid_until: "2025-01-12".to_string(),
            },
            supermarket: Supermarket {
                id: Id::from((1..20).fake::<u64>()),
                slug: supermarket_name.to_lowercase().replace(' ', "-"),
                name: supermarket_name,
                logo: None,
            },
        }
    }
}

/// Pagination metadata of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMeta {
    pub total: u64,
    pub total_pages: u64,
}

/// Upstream response body: `{ data, meta? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListingMeta>,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data, meta: None }
    }

    pub fn with_meta(data: T, meta: ListingMeta) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }
}
