use anyhow::Context;
use shared::listing::{
    ListingQueryState, PriceRange, DEFAULT_MIN_PRICE, PRICE_CEILING,
};
use shared::log_config::LogConfig;
use validator::Validate;

#[derive(clap::Parser)]
#[command(name = "browser", about = "Browse brochure products")]
pub struct AppConfig {
    #[clap(long, env, default_value = "http://localhost:5000/")]
    pub proxy_url: String,

    #[clap(flatten)]
    pub log: LogConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Search and filter products
    List(ListArgs),
    /// Show a single product
    Show { id: String },
    /// List product categories
    Categories,
    /// List supermarkets
    Supermarkets,
    /// Read listing commands from stdin
    Interactive,
}

#[derive(clap::Args, Clone, Debug, Validate)]
pub struct ListArgs {
    #[clap(long)]
    pub search: Option<String>,

    #[clap(long, help = "Supermarket slug")]
    pub store: Option<String>,

    #[clap(long)]
    pub category: Option<String>,

    #[clap(long, default_value_t = DEFAULT_MIN_PRICE)]
    #[validate(range(max = 100))]
    pub min_price: u32,

    #[clap(long, default_value_t = PRICE_CEILING)]
    #[validate(range(max = 100))]
    pub max_price: u32,

    #[clap(long, default_value_t = 1)]
    #[validate(range(min = 1))]
    pub page: u64,
}

impl ListArgs {
    pub fn to_state(&self) -> anyhow::Result<ListingQueryState> {
        self.validate().context("Invalid listing arguments")?;

        let mut state = ListingQueryState::new();
        state.apply_debounced_search(self.search.as_deref().unwrap_or_default());
        state.set_store(self.store.as_deref().unwrap_or_default());
        state.set_category(self.category.as_deref().unwrap_or_default());
        state.set_price_range(PriceRange::new(self.min_price, self.max_price)?);
        state.set_page(self.page)?;

        Ok(state)
    }
}
