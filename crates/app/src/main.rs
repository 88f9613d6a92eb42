use dioxus::prelude::*;
use shared_types::SearchSettings;

mod routes;
pub mod search;
use routes::Route;

fn main() {
    #[cfg(feature = "server")]
    dioxus::serve(|| async move {
        server::config::load_config();
        let flags = server::config::feature_flags();

        if flags.telemetry {
            server::telemetry::init_telemetry();
        }
        server::health::record_start_time();

        let pool = server::db::create_pool()?;
        match server::db::run_migrations(&pool).await {
            Ok(()) => server::db::mark_migrated(),
            Err(e) => tracing::error!(error = %e, "Failed to run database migrations"),
        }

        let state = server::db::install_state(server::db::AppState::postgres(pool)).clone();

        let mut router = dioxus::server::router(App).merge(server::openapi::api_router(state));

        if flags.telemetry {
            router = router.layer(server::telemetry::OtelTraceLayer);
        }

        let router = router
            .layer(axum::middleware::from_fn(
                server::auth::middleware::auth_middleware,
            ))
            .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
            .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
                tower_http::request_id::MakeRequestUuid,
            ));
        Ok(router)
    });

    #[cfg(not(feature = "server"))]
    dioxus::launch(App);
}

/// Detect the client platform from compile-time feature flags.
pub fn client_platform() -> &'static str {
    if cfg!(feature = "web") {
        "web"
    } else if cfg!(feature = "desktop") {
        "desktop"
    } else if cfg!(feature = "mobile") {
        "mobile"
    } else {
        "unknown"
    }
}

#[component]
fn App() -> Element {
    // Set the X-Client-Platform header on all server function calls
    use_hook(|| {
        use dioxus::fullstack::{set_request_headers, HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-client-platform",
            HeaderValue::from_static(client_platform()),
        );
        set_request_headers(headers);
    });

    // Search tunables come from the server's config.toml; defaults on error.
    let settings_resource =
        use_server_future(move || async move { server::api::get_search_settings().await })?;

    let settings = settings_resource
        .read()
        .as_ref()
        .cloned()
        .unwrap_or(Ok(SearchSettings::default()))
        .unwrap_or_default();

    use_context_provider(|| settings);

    rsx! {
        SuspenseBoundary {
            fallback: |_| rsx! {
                div { class: "app-loading",
                    p { "Loading..." }
                }
            },
            Router::<Route> {}
        }
    }
}
