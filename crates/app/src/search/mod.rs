//! Client side of global search: the session state machine, palette
//! state, and the hook that drives them against the server functions.

pub mod controller;
pub mod palette;

pub use controller::{InputEffect, IssuedSearch, SearchController, SearchPhase};
pub use palette::{Activation, PaletteAction, PaletteController, PaletteKey};

use dioxus::core::Task;
use dioxus::prelude::*;
use shared_types::{AppError, SearchClickEvent, SearchSettings};

/// Handle returned by [`use_global_search`]. Copyable into event handlers.
///
/// The debounce timer and the request it triggers run in one task, so
/// cancelling that task drops both. Tasks belong to the calling component
/// and stop when it unmounts.
#[derive(Clone, Copy, PartialEq)]
pub struct GlobalSearch {
    pub state: Signal<SearchController>,
    pending: Signal<Option<Task>>,
}

pub fn use_global_search(settings: SearchSettings) -> GlobalSearch {
    let state = use_signal(|| SearchController::new(&settings));
    let pending = use_signal(|| None::<Task>);
    GlobalSearch { state, pending }
}

impl GlobalSearch {
    fn supersede(mut self) {
        if let Some(task) = self.pending.write().take() {
            task.cancel();
        }
    }

    /// Feed a keystroke.
    pub fn input(mut self, query: String) {
        self.supersede();
        let effect = self.state.write().input(&query);
        if let InputEffect::Debounce { ticket, delay_ms } = effect {
            let task = spawn(async move {
                sleep_ms(delay_ms).await;
                self.run(ticket).await;
            });
            self.pending.set(Some(task));
        }
    }

    async fn run(mut self, ticket: u64) {
        let Some(issued) = self.state.write().debounce_elapsed(ticket) else {
            return;
        };

        match server::api::global_search(issued.request).await {
            Ok(response) => {
                self.state.write().resolve(issued.generation, response);
            }
            Err(e) => {
                let message = AppError::friendly_message(&e.to_string());
                tracing::warn!(error = %e, "Global search request failed");
                self.state.write().fail(issued.generation, message);
            }
        }
        self.pending.set(None);
    }

    pub fn cancel(mut self) {
        self.supersede();
        self.state.write().cancel();
    }

    /// Clear the query and results, e.g. when the palette closes.
    pub fn reset(mut self) {
        self.supersede();
        self.state.write().reset();
    }

    /// Refresh the recent-search list from the server.
    pub fn load_recent(mut self) {
        spawn(async move {
            match server::api::recent_searches().await {
                Ok(recent) => self.state.write().set_recent(recent),
                Err(e) => tracing::debug!(error = %e, "Could not load recent searches"),
            }
        });
    }

    /// Fire-and-forget click analytics.
    pub fn record_click(self, event: SearchClickEvent) {
        spawn(async move {
            if let Err(e) = server::api::record_search_click(event).await {
                tracing::debug!(error = %e, "Could not record search click");
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(u32::try_from(ms).unwrap_or(u32::MAX)).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}
