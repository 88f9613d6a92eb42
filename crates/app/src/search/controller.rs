//! Client search session state machine.
//!
//! `Idle -> Debouncing -> Inflight -> {Resolved | Cancelled | Errored}`.
//!
//! Two counters keep late events from touching newer state: the debounce
//! `ticket` identifies the latest keystroke timer, and the request
//! `generation` identifies the latest issued request. Any timer or response
//! carrying an older value is ignored.

use shared_types::{
    CategoryMap, GlobalSearchRequest, GlobalSearchResponse, RecentSearch, SearchResult,
    SearchSettings,
};

/// Recent queries kept client-side between server refreshes.
const RECENT_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    Inflight,
    Resolved,
    Cancelled,
    Errored,
}

/// What the owner must do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEffect {
    /// Results were cleared synchronously. Drop any pending timer or request.
    Cleared,
    /// (Re)start the debounce timer; report back with this ticket.
    Debounce { ticket: u64, delay_ms: u64 },
}

/// A request the owner should send, tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedSearch {
    pub generation: u64,
    pub request: GlobalSearchRequest,
}

#[derive(Debug, Clone)]
pub struct SearchController {
    debounce_ms: u64,
    min_query_length: usize,
    limit: i64,
    filters: Vec<String>,
    query: String,
    phase: SearchPhase,
    ticket: u64,
    generation: u64,
    results: Vec<SearchResult>,
    categories: CategoryMap,
    total_count: usize,
    error: Option<String>,
    recent: Vec<String>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(&SearchSettings::default())
    }
}

impl SearchController {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            debounce_ms: settings.debounce_ms,
            min_query_length: settings.min_query_length,
            limit: i64::try_from(settings.default_limit).unwrap_or(10),
            filters: Vec::new(),
            query: String::new(),
            phase: SearchPhase::Idle,
            ticket: 0,
            generation: 0,
            results: Vec::new(),
            categories: CategoryMap::new(),
            total_count: 0,
            error: None,
            recent: Vec::new(),
        }
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SearchPhase::Debouncing | SearchPhase::Inflight)
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_length
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.categories = CategoryMap::new();
        self.total_count = 0;
    }

    /// A keystroke. Short queries clear immediately without waiting for the
    /// timer; anything else (re)starts the debounce and supersedes any
    /// request in flight.
    pub fn input(&mut self, query: &str) -> InputEffect {
        self.query = query.to_string();
        self.ticket += 1;
        if self.phase == SearchPhase::Inflight {
            self.generation += 1;
        }

        if !self.is_searchable(query) {
            self.generation += 1;
            self.clear_results();
            self.error = None;
            self.phase = SearchPhase::Idle;
            return InputEffect::Cleared;
        }

        self.phase = SearchPhase::Debouncing;
        InputEffect::Debounce {
            ticket: self.ticket,
            delay_ms: self.debounce_ms,
        }
    }

    /// The debounce timer for `ticket` fired. Returns the request to send,
    /// or `None` when a newer keystroke or a cancel got there first.
    pub fn debounce_elapsed(&mut self, ticket: u64) -> Option<IssuedSearch> {
        if ticket != self.ticket || self.phase != SearchPhase::Debouncing {
            return None;
        }
        self.generation += 1;
        self.phase = SearchPhase::Inflight;
        Some(IssuedSearch {
            generation: self.generation,
            request: GlobalSearchRequest::new(self.query.trim())
                .with_limit(self.limit)
                .with_filters(self.filters.iter().cloned()),
        })
    }

    /// Apply a response. Returns `false` and changes nothing when the
    /// response belongs to a superseded or cancelled request.
    pub fn resolve(&mut self, generation: u64, response: GlobalSearchResponse) -> bool {
        if generation != self.generation || self.phase != SearchPhase::Inflight {
            return false;
        }
        self.results = response.results;
        self.categories = response.categories;
        self.total_count = response.total_count;
        self.error = None;
        self.phase = SearchPhase::Resolved;
        let query = self.query.trim().to_string();
        self.remember(&query);
        true
    }

    /// Record a failed request. Stale failures are ignored like stale responses.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation || self.phase != SearchPhase::Inflight {
            return false;
        }
        self.clear_results();
        self.error = Some(message.into());
        self.phase = SearchPhase::Errored;
        true
    }

    /// Abandon the pending timer and any request in flight. Safe to call
    /// repeatedly and after the request completed.
    pub fn cancel(&mut self) {
        if matches!(self.phase, SearchPhase::Debouncing | SearchPhase::Inflight) {
            self.ticket += 1;
            self.generation += 1;
            self.phase = SearchPhase::Cancelled;
        }
    }

    /// Back to a blank session, keeping the recent list.
    pub fn reset(&mut self) {
        self.cancel();
        self.query.clear();
        self.clear_results();
        self.error = None;
        self.phase = SearchPhase::Idle;
    }

    /// Replace the recent list with the server's copy.
    pub fn set_recent(&mut self, recent: Vec<RecentSearch>) {
        self.recent = recent
            .into_iter()
            .map(|r| r.query)
            .take(RECENT_CAP)
            .collect();
    }

    /// Move `query` to the front of the recent list.
    pub fn remember(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.recent.retain(|q| q != query);
        self.recent.insert(0, query.to_string());
        self.recent.truncate(RECENT_CAP);
    }
}
