use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::Response,
};
use opentelemetry::{
    global,
    trace::{SpanKind, TraceContextExt, Tracer},
    Context, KeyValue,
};
use opentelemetry_otlp::tonic_types::{metadata::MetadataMap, transport::ClientTlsConfig};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use std::{
    future::Future,
    pin::Pin,
    sync::OnceLock,
    task::{Context as TaskContext, Poll},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::jwt::Claims;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const TRACER_NAME: &str = "lead-search";

/// Keep the LoggerProvider alive for the process lifetime.
static LOGGER_PROVIDER: OnceLock<opentelemetry_sdk::logs::SdkLoggerProvider> = OnceLock::new();

/// Tokio runtime for the OTLP gRPC exporters. Tonic's `connect_lazy()`
/// calls `tokio::spawn`, and the runtime context may not be propagated yet
/// when `dioxus::serve` runs the init closure.
static OTEL_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// Optional `ingestion-key` header for hosted collectors.
fn ingestion_metadata() -> Option<MetadataMap> {
    let key = std::env::var("OTLP_INGESTION_KEY").ok().filter(|k| !k.is_empty())?;
    match key.parse() {
        Ok(value) => {
            let mut metadata = MetadataMap::new();
            metadata.insert("ingestion-key", value);
            Some(metadata)
        }
        Err(_) => {
            eprintln!("OTLP_INGESTION_KEY is not a valid header value, ignoring");
            None
        }
    }
}

/// Point an OTLP gRPC exporter builder at the collector. `https://`
/// endpoints get native-root TLS.
fn configure_exporter<B>(builder: B, endpoint: &str) -> B
where
    B: WithExportConfig + WithTonicConfig,
{
    let mut builder = builder.with_endpoint(endpoint);
    if endpoint.starts_with("https://") {
        builder = builder.with_tls_config(ClientTlsConfig::new().with_native_roots());
    }
    if let Some(metadata) = ingestion_metadata() {
        builder = builder.with_metadata(metadata);
    }
    builder
}

/// Set up the OpenTelemetry trace and log exporters.
///
/// Dioxus owns the tracing subscriber, so this only configures OTLP export
/// for HTTP spans (via `OtelTraceLayer`) and `log` records. Failures are
/// reported on stderr and leave search serving untouched.
///
/// Reads config from environment:
///   - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector gRPC address, e.g. `http://localhost:4317`
///   - `OTEL_SERVICE_NAME`: service name tag (default: `lead-search`)
///   - `OTLP_INGESTION_KEY`: hosted collector access token (optional)
///   - `DEPLOY_ENV`: deployment environment tag (default: `development`)
pub fn init_telemetry() {
    let _ = dotenvy::dotenv();

    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        eprintln!("OTEL_EXPORTER_OTLP_ENDPOINT not set, skipping OTLP telemetry");
        return;
    };

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| TRACER_NAME.to_string());
    let environment = std::env::var("DEPLOY_ENV").unwrap_or_else(|_| "development".to_string());

    if OTEL_RUNTIME.get().is_none() {
        match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .worker_threads(1)
            .build()
        {
            Ok(runtime) => {
                let _ = OTEL_RUNTIME.set(runtime);
            }
            Err(e) => {
                eprintln!("Failed to create OTEL runtime: {e}");
                return;
            }
        }
    }
    let Some(rt) = OTEL_RUNTIME.get() else {
        return;
    };
    let _guard = rt.enter();

    let span_exporter = configure_exporter(
        opentelemetry_otlp::SpanExporter::builder().with_tonic(),
        &endpoint,
    )
    .build();
    let log_exporter = configure_exporter(
        opentelemetry_otlp::LogExporter::builder().with_tonic(),
        &endpoint,
    )
    .build();
    let (span_exporter, log_exporter) = match (span_exporter, log_exporter) {
        (Ok(spans), Ok(logs)) => (spans, logs),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Failed to create OTLP exporter: {e}");
            return;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", APP_VERSION))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource.clone())
        .build();
    global::set_tracer_provider(tracer_provider);

    let logger_provider = LOGGER_PROVIDER.get_or_init(|| {
        opentelemetry_sdk::logs::SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource)
            .build()
    });

    let bridge = opentelemetry_appender_log::OpenTelemetryLogBridge::new(logger_provider);
    if log::set_boxed_logger(Box::new(bridge)).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    } else {
        eprintln!("Log bridge skipped, log crate logger already set");
    }

    eprintln!("Telemetry initialized v{APP_VERSION}, exporting to {endpoint}");
}

/// Span name for a request path: UUID segments become `{id}` so that
/// `/api/search/recent` and `/leads/<uuid>` group cleanly.
pub fn route_name(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Client platform reported by the Dioxus app in `x-client-platform`.
pub fn client_platform(headers: &HeaderMap) -> &str {
    headers
        .get("x-client-platform")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
}

/// Tower layer that creates an OpenTelemetry span for each HTTP request.
///
/// Captures method, route, request ID, client platform, response status and
/// the authenticated caller (user, tenant, role) when present.
#[derive(Clone)]
pub struct OtelTraceLayer;

impl<S> Layer<S> for OtelTraceLayer {
    type Service = OtelTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OtelTraceService { inner }
    }
}

#[derive(Clone)]
pub struct OtelTraceService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for OtelTraceService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let tracer = global::tracer(TRACER_NAME);
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut attributes = vec![
            KeyValue::new("http.method", method.clone()),
            KeyValue::new("http.target", path.clone()),
            KeyValue::new("http.request_id", request_id),
            KeyValue::new("client.platform", client_platform(req.headers()).to_string()),
        ];

        match req.extensions().get::<Claims>() {
            Some(claims) => {
                attributes.push(KeyValue::new("user.id", claims.sub.to_string()));
                attributes.push(KeyValue::new("user.role", claims.role.clone()));
                if let Some(company_id) = claims.company_id {
                    attributes.push(KeyValue::new("tenant.id", company_id.to_string()));
                }
                attributes.push(KeyValue::new("auth.status", "authenticated"));
            }
            None => attributes.push(KeyValue::new("auth.status", "anonymous")),
        }

        let span = tracer
            .span_builder(format!("{} {}", &method, route_name(&path)))
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        let cx = Context::current_with_span(span);
        let mut inner = self.inner.clone();

        let guard = cx.clone().attach();
        let future = inner.call(req);
        drop(guard);

        Box::pin(async move {
            let response = future.await?;

            let span = cx.span();
            let status = response.status();
            span.set_attribute(KeyValue::new("http.status_code", status.as_u16() as i64));

            if status.is_server_error() {
                span.set_status(opentelemetry::trace::Status::error(status.to_string()));
            } else if status.is_client_error() {
                span.set_attribute(KeyValue::new("error.type", "client_error"));
            }

            Ok(response)
        })
    }
}
