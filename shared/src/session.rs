use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::client::{CatalogError, ProductSource};
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::listing::{ListingError, ListingQuery, ListingQueryState, PriceRange};
use crate::pagination::{pagination_range, PaginationRange, DEFAULT_SIBLING_COUNT};
use crate::product::{Envelope, Product};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load products";
pub const NO_PRODUCTS_MESSAGE: &str = "No products found";

const EVENT_BUFFER: usize = 64;

/// User input driving a listing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEvent {
    Search(String),
    Store(String),
    Category(String),
    PriceRange(PriceRange),
    ResetFilters,
    Page(u64),
    NextPage,
    PreviousPage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
    /// Absent when everything fits on a single page.
    pub pagination: Option<PaginationRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ListingView {
    Loading,
    Failed { message: String },
    Empty { message: String },
    Loaded(ListingPage),
}

impl ListingView {
    pub fn from_envelope(envelope: Envelope<Vec<Product>>, page: u64) -> Self {
        if envelope.data.is_empty() {
            return ListingView::Empty {
                message: NO_PRODUCTS_MESSAGE.to_string(),
            };
        }

        let total = envelope
            .meta
            .map(|meta| meta.total)
            .unwrap_or(envelope.data.len() as u64);
        let total_pages =
            envelope.meta.map(|meta| meta.total_pages).unwrap_or(1);
        let pagination = (total_pages > 1).then(|| {
            pagination_range(page, total_pages, DEFAULT_SIBLING_COUNT)
        });

        ListingView::Loaded(ListingPage {
            products: envelope.data,
            total,
            page,
            total_pages,
            pagination,
        })
    }

    pub fn failed() -> Self {
        ListingView::Failed {
            message: LOAD_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Handle to a running [`ListingSession`].
#[derive(Clone)]
pub struct ListingHandle {
    events: mpsc::Sender<ListingEvent>,
    view: watch::Receiver<ListingView>,
}

impl ListingHandle {
    /// Returns `false` once the session stopped.
    pub async fn send(&self, event: ListingEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub fn view(&self) -> ListingView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.view.clone()
    }
}

type FetchResult = (ListingQuery, Result<Envelope<Vec<Product>>, CatalogError>);

/// Owns the listing state and fetches a new listing whenever its query
/// changes. Search text is debounced; responses to queries that are no
/// longer current are dropped.
pub struct ListingSession<S> {
    source: Arc<S>,
    state: ListingQueryState,
    debouncer: Debouncer<String>,
    last_issued: Option<ListingQuery>,
    awaiting: bool,
    /// Page count of the current filters, 0 until their first response.
    total_pages: u64,
    view: watch::Sender<ListingView>,
    results_tx: mpsc::UnboundedSender<FetchResult>,
    results_rx: mpsc::UnboundedReceiver<FetchResult>,
}

impl<S: ProductSource> ListingSession<S> {
    pub fn new(source: Arc<S>, debounce: Duration) -> (Self, watch::Receiver<ListingView>) {
        let (view, view_rx) = watch::channel(ListingView::Loading);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let session = Self {
            source,
            state: ListingQueryState::new(),
            debouncer: Debouncer::new(debounce),
            last_issued: None,
            awaiting: false,
            total_pages: 0,
            view,
            results_tx,
            results_rx,
        };

        (session, view_rx)
    }

    /// Starts a session with the default search debounce.
    pub fn spawn(source: Arc<S>) -> (ListingHandle, JoinHandle<()>) {
        let (session, view) = Self::new(source, SEARCH_DEBOUNCE);
        let (events, events_rx) = mpsc::channel(EVENT_BUFFER);

        let task = tokio::spawn(session.run(events_rx));

        (ListingHandle { events, view }, task)
    }

    pub fn state(&self) -> &ListingQueryState {
        &self.state
    }

    /// Runs until every [`ListingHandle`] is dropped. A pending search is
    /// then applied and the last issued fetch is published before stopping.
    pub async fn run(mut self, mut events: mpsc::Receiver<ListingEvent>) {
        self.issue_if_changed();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.apply(event),
                    None => break,
                },
                search = self.debouncer.settled() => {
                    self.state.apply_debounced_search(&search);
                    self.issue_if_changed();
                },
                Some((query, result)) = self.results_rx.recv() => {
                    self.accept(query, result);
                },
            }
        }

        self.finish().await;

        tracing::debug!("Listing session stopped");
    }

    async fn finish(&mut self) {
        if let Some(search) = self.debouncer.flush() {
            self.state.apply_debounced_search(&search);
            self.issue_if_changed();
        }

        while self.awaiting {
            match self.results_rx.recv().await {
                Some((query, result)) => self.accept(query, result),
                None => break,
            }
        }
    }

    fn apply(&mut self, event: ListingEvent) {
        tracing::debug!(?event, "Listing event");

        match event {
            ListingEvent::Search(text) => {
                self.state.set_search_text(text.clone());
                self.debouncer.push(text);
                return;
            }
            ListingEvent::Store(slug) => {
                self.state.set_store(&slug);
            }
            ListingEvent::Category(name) => {
                self.state.set_category(&name);
            }
            ListingEvent::PriceRange(price_range) => {
                self.state.set_price_range(price_range);
            }
            ListingEvent::ResetFilters => {
                self.state.reset_filters();
            }
            ListingEvent::Page(page) => {
                if self.total_pages > 0 && page > self.total_pages {
                    tracing::warn!(
                        page,
                        total_pages = self.total_pages,
                        "Ignoring page past the end"
                    );
                } else if let Err(ListingError::InvalidPage(page)) =
                    self.state.set_page(page)
                {
                    tracing::warn!(page, "Ignoring invalid page");
                }
            }
            ListingEvent::NextPage => {
                self.state.next_page(self.total_pages);
            }
            ListingEvent::PreviousPage => {
                self.state.previous_page();
            }
        }

        self.issue_if_changed();
    }

    fn issue_if_changed(&mut self) {
        let query = self.state.query();
        if self.last_issued.as_ref() == Some(&query) {
            return;
        }

        let same_filters = self
            .last_issued
            .as_ref()
            .is_some_and(|last| last.same_filters(&query));
        if !same_filters {
            self.total_pages = 0;
        }

        tracing::debug!(?query, "Fetching listing");
        self.last_issued = Some(query.clone());
        self.awaiting = true;
        self.view.send_replace(ListingView::Loading);

        let source = Arc::clone(&self.source);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_products(&query).await;
            // the session may already be gone
            let _ = results.send((query, result));
        });
    }

    fn accept(
        &mut self,
        query: ListingQuery,
        result: Result<Envelope<Vec<Product>>, CatalogError>,
    ) {
        if self.last_issued.as_ref() != Some(&query) {
            tracing::debug!(?query, "Discarding stale listing response");
            return;
        }
        self.awaiting = false;

        let view = match result {
            Ok(envelope) => {
                self.total_pages = envelope
                    .meta
                    .map(|meta| meta.total_pages)
                    .unwrap_or(1);
                ListingView::from_envelope(envelope, query.page)
            }
            Err(error) => {
                tracing::error!(%error, "Failed to load listing");
                ListingView::failed()
            }
        };

        self.view.send_replace(view);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;
    use crate::product::ListingMeta;

    /// Serves listings with a per-search delay and records every query.
    /// Stores listed in `stores` answer after their own delay with their
    /// own page count; everything else has 20 pages.
    #[derive(Default)]
    struct FakeSource {
        delays: HashMap<Option<String>, Duration>,
        stores: HashMap<String, (Duration, u64)>,
        fail: bool,
        empty: bool,
        queries: Mutex<Vec<ListingQuery>>,
    }

    impl FakeSource {
        fn queries(&self) -> Vec<ListingQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn fetch_products(
            &self,
            query: &ListingQuery,
        ) -> Result<Envelope<Vec<Product>>, CatalogError> {
            self.queries.lock().unwrap().push(query.clone());
            if let Some(delay) = self.delays.get(&query.search) {
                time::sleep(*delay).await;
            }
            let (store_delay, total_pages) = query
                .supermarket
                .as_ref()
                .and_then(|slug| self.stores.get(slug))
                .copied()
                .unwrap_or((Duration::ZERO, 20));
            time::sleep(store_delay).await;
            if self.fail {
                return Err(CatalogError::Status {
                    status: 500,
                    message: "Failed to fetch products".to_string(),
                });
            }
            if self.empty || query.page > total_pages {
                return Ok(Envelope::with_meta(
                    vec![],
                    ListingMeta {
                        total: 0,
                        total_pages: if self.empty { 0 } else { total_pages },
                    },
                ));
            }

            let mut product = Product::fake(query.page);
            product.name = query.search.clone().unwrap_or_default();
            Ok(Envelope::with_meta(
                vec![product],
                ListingMeta {
                    total: total_pages * 10,
                    total_pages,
                },
            ))
        }
    }

    async fn settle() {
        time::sleep(Duration::from_secs(5)).await;
    }

    fn loaded(view: ListingView) -> ListingPage {
        match view {
            ListingView::Loaded(page) => page,
            other => panic!("expected a loaded listing, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initial_listing_is_loaded() {
        let source = Arc::new(FakeSource::default());
        let (handle, _task) = ListingSession::spawn(source.clone());

        settle().await;

        let page = loaded(handle.view());
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 200);
        assert_eq!(
            page.pagination.unwrap().to_string(),
            "1 2 … 20"
        );
        assert_eq!(source.queries(), vec![ListingQuery::default()]);
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_are_debounced() {
        let source = Arc::new(FakeSource::default());
        let (handle, _task) = ListingSession::spawn(source.clone());
        settle().await;

        for text in ["c", "ch", "che", "chees", "cheese"] {
            handle.send(ListingEvent::Search(text.to_string())).await;
            time::sleep(Duration::from_millis(100)).await;
        }
        settle().await;

        let searches: Vec<Option<String>> =
            source.queries().into_iter().map(|q| q.search).collect();
        assert_eq!(searches, vec![None, Some("cheese".to_string())]);
        assert_eq!(loaded(handle.view()).products[0].name, "cheese");
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_fetches_page_one() {
        let source = Arc::new(FakeSource::default());
        let (handle, _task) = ListingSession::spawn(source.clone());
        settle().await;

        handle.send(ListingEvent::Page(7)).await;
        settle().await;
        assert_eq!(loaded(handle.view()).page, 7);

        handle.send(ListingEvent::Store("lidl".to_string())).await;
        settle().await;

        let last = source.queries().pop().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.supermarket.as_deref(), Some("lidl"));
        assert_eq!(source.queries().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn next_page_uses_known_total() {
        let source = Arc::new(FakeSource::default());
        let (handle, _task) = ListingSession::spawn(source.clone());
        settle().await;

        handle.send(ListingEvent::Page(20)).await;
        settle().await;
        handle.send(ListingEvent::NextPage).await;
        settle().await;

        assert_eq!(loaded(handle.view()).page, 20);
        assert_eq!(source.queries().len(), 2);

        handle.send(ListingEvent::PreviousPage).await;
        settle().await;
        let page = loaded(handle.view());
        assert_eq!(page.page, 19);
        assert_eq!(page.pagination.unwrap().render(19), "1 … 18 [19] 20");
    }

    #[tokio::test(start_paused = true)]
    async fn next_page_waits_for_the_new_filters_total() {
        let source = Arc::new(FakeSource {
            stores: HashMap::from([(
                "tiny".to_string(),
                (Duration::from_secs(2), 1),
            )]),
            ..Default::default()
        });
        let (handle, _task) = ListingSession::spawn(source.clone());
        settle().await;
        assert_eq!(loaded(handle.view()).total_pages, 20);

        handle.send(ListingEvent::Store("tiny".to_string())).await;
        time::sleep(Duration::from_millis(100)).await;
        handle.send(ListingEvent::NextPage).await;
        settle().await;

        let page = loaded(handle.view());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        let queries = source.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].supermarket.as_deref(), Some("tiny"));
        assert_eq!(queries[1].page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn page_past_known_total_is_ignored() {
        let source = Arc::new(FakeSource::default());
        let (handle, _task) = ListingSession::spawn(source.clone());
        settle().await;

        handle.send(ListingEvent::Page(21)).await;
        handle.send(ListingEvent::Page(0)).await;
        settle().await;

        assert_eq!(loaded(handle.view()).page, 1);
        assert_eq!(source.queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_applies_pending_search_and_publishes_it() {
        let source = Arc::new(FakeSource {
            delays: HashMap::from([(
                Some("tea".to_string()),
                Duration::from_secs(1),
            )]),
            ..Default::default()
        });
        let (handle, task) = ListingSession::spawn(source.clone());
        let mut view = handle.subscribe();
        settle().await;

        handle.send(ListingEvent::Search("tea".to_string())).await;
        drop(handle);
        task.await.unwrap();

        assert_eq!(source.queries().pop().unwrap().search.as_deref(), Some("tea"));
        assert_eq!(loaded(view.borrow_and_update().clone()).products[0].name, "tea");
        assert!(view.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let source = Arc::new(FakeSource {
            delays: HashMap::from([
                (Some("slow".to_string()), Duration::from_secs(3)),
                (Some("fast".to_string()), Duration::from_millis(10)),
            ]),
            ..Default::default()
        });
        let (session, mut view) =
            ListingSession::new(source.clone(), SEARCH_DEBOUNCE);
        let (events, events_rx) = mpsc::channel(8);
        let _task = tokio::spawn(session.run(events_rx));
        settle().await;

        events.send(ListingEvent::Search("slow".to_string())).await.unwrap();
        time::sleep(Duration::from_secs(1)).await;
        events.send(ListingEvent::Search("fast".to_string())).await.unwrap();
        time::sleep(Duration::from_secs(1)).await;

        // "fast" is published while "slow" is still in flight
        assert_eq!(loaded(view.borrow_and_update().clone()).products[0].name, "fast");

        settle().await;
        assert!(!view.has_changed().unwrap());
        assert_eq!(loaded(view.borrow().clone()).products[0].name, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_and_empty_views() {
        let failing = Arc::new(FakeSource {
            fail: true,
            ..Default::default()
        });
        let (handle, _task) = ListingSession::spawn(failing.clone());
        settle().await;
        assert_eq!(handle.view(), ListingView::failed());
        assert_eq!(failing.queries().len(), 1);

        let empty = Arc::new(FakeSource {
            empty: true,
            ..Default::default()
        });
        let (handle, _task) = ListingSession::spawn(empty);
        settle().await;
        assert_eq!(
            handle.view(),
            ListingView::Empty {
                message: NO_PRODUCTS_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn single_page_listing_has_no_pagination() {
        let view = ListingView::from_envelope(
            Envelope::new(vec![Product::fake(1), Product::fake(2)]),
            1,
        );

        let page = loaded(view);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.pagination, None);
    }
}
