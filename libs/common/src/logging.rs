//! Unified logging module for Summit Ops services
//!
//! Console plus daily rolling files. Events with the `api_access` target go to
//! a separate `{service}_api.log.{date}` file so HTTP traffic does not drown
//! the business log.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by the HTTP access log
pub const API_ACCESS_TARGET: &str = "api_access";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2026-03-02T00:50:44.809112Z [INFO] Service started`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Non-blocking writers flush on drop, so the guards live for the whole process
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut guards) => guards.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used for file names and the default filter
    pub service_name: String,
    /// Directory for log files; `None` logs to the console only
    pub log_dir: Option<PathBuf>,
    /// Default level when `RUST_LOG` is not set
    pub level: Level,
    /// JSON lines instead of the bracketed format in files
    pub enable_json: bool,
    /// Write `api_access` events to their own file
    pub enable_api_log: bool,
    /// Level for the `api_access` target
    pub api_log_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: Some(PathBuf::from("logs")),
            level: Level::INFO,
            enable_json: false,
            enable_api_log: true,
            api_log_level: Level::INFO,
        }
    }
}

/// Build the filter string from `RUST_LOG` or the configured level
///
/// An explicit `api_access` directive in `RUST_LOG` wins; otherwise the access
/// log follows the config, upgraded to debug when `RUST_LOG` asks for debug.
fn build_filter(config: &LogConfig, rust_log: Option<&str>) -> String {
    let api_level = if config.enable_api_log {
        config.api_log_level.as_str().to_lowercase()
    } else {
        "off".to_string()
    };

    match rust_log {
        Some(env_str) if env_str.contains(API_ACCESS_TARGET) => env_str.to_string(),
        Some(env_str) => {
            let effective = if env_str.contains("debug") || env_str.contains("trace") {
                "debug".to_string()
            } else {
                api_level
            };
            format!("{},{}={}", env_str, API_ACCESS_TARGET, effective)
        },
        None => format!(
            "{},{}={}",
            config.level.as_str().to_lowercase(),
            API_ACCESS_TARGET,
            api_level
        ),
    }
}

/// Initialize the global subscriber
pub fn init_with_config(config: LogConfig) -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter_str = build_filter(&config, rust_log.as_deref());
    let env_filter = EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", filter_str, e))?;

    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(BracketedLevelFormat)
        .boxed();

    let mut file_layers = Vec::new();
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let appender =
            tracing_appender::rolling::daily(log_dir, format!("{}.log", config.service_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        keep_guard(guard);

        let business_layer = if config.enable_json {
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_filter(filter::filter_fn(|metadata| {
                    metadata.target() != API_ACCESS_TARGET
                }))
                .boxed()
        } else {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .with_filter(filter::filter_fn(|metadata| {
                    metadata.target() != API_ACCESS_TARGET
                }))
                .boxed()
        };
        file_layers.push(business_layer);

        if config.enable_api_log {
            let api_appender = tracing_appender::rolling::daily(
                log_dir,
                format!("{}_api.log", config.service_name),
            );
            let (api_writer, api_guard) = tracing_appender::non_blocking(api_appender);
            keep_guard(api_guard);

            file_layers.push(
                fmt::layer()
                    .with_writer(api_writer)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .with_filter(filter::filter_fn(|metadata| {
                        metadata.target() == API_ACCESS_TARGET
                    }))
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Logging already initialized: {}", e))?;

    match &config.log_dir {
        Some(dir) => tracing::info!("Logging: {} @ {:?}", config.service_name, dir),
        None => tracing::info!("Logging: {} (console only)", config.service_name),
    }

    Ok(())
}

// ============================================================================
// HTTP API Request Logging Middleware
// ============================================================================

const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

/// Redact sensitive fields in a JSON string
///
/// Any object key containing one of [`SENSITIVE_KEYS`] (case-insensitive) has
/// its value replaced with `***REDACTED***`, at any depth. Non-JSON input is
/// returned unchanged.
pub fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::Value;

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };

    fn redact_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|&k| key_lower.contains(k)) {
                        *val = Value::String("***REDACTED***".to_string());
                    } else {
                        redact_recursive(val);
                    }
                }
            },
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_recursive(item);
                }
            },
            _ => {},
        }
    }

    redact_recursive(&mut value);

    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

/// Truncate body string to at most `max_length` bytes on a char boundary
pub fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }

    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

/// HTTP API request logger middleware
///
/// - **INFO**: modifying requests (POST/PUT/PATCH/DELETE), no body
/// - **DEBUG**: every request; JSON bodies of modifying requests are logged
///   truncated to 500 bytes with sensitive fields redacted
///
/// Events use the `api_access` target and land in the API log file.
///
/// Add it to the router **before** `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     // ... routes ...
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_modifying = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let is_json = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let start = Instant::now();

    let should_read_body = level_enabled!(Level::DEBUG) && is_modifying && is_json;

    let (req, body_str) = if should_read_body {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                let new_req = axum::extract::Request::from_parts(parts, Body::empty());
                return next.run(new_req).await;
            },
        };

        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };

        let new_req = axum::extract::Request::from_parts(parts, Body::from(bytes));
        (new_req, Some(body_str))
    } else {
        (req, None)
    };

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if is_modifying {
        info!(
            target: "api_access",
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration_ms,
            "HTTP request"
        );
    }

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration_ms,
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if !is_modifying => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
        None => {},
    }

    response
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_redact_nested_secret() {
        let body = r#"{"secret":"s3cr3t","values":["A"],"meta":{"api_key":"k","rep":"Sam"}}"#;
        let redacted: serde_json::Value =
            serde_json::from_str(&redact_sensitive_fields(body)).unwrap();

        assert_eq!(redacted["secret"], "***REDACTED***");
        assert_eq!(redacted["meta"]["api_key"], "***REDACTED***");
        assert_eq!(redacted["meta"]["rep"], "Sam");
        assert_eq!(redacted["values"][0], "A");
    }

    #[test]
    fn test_redact_non_json_passthrough() {
        assert_eq!(redact_sensitive_fields("not json"), "not json");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 10), "short");
        assert_eq!(truncate_body("abcdef", 4), "abcd[truncated 2 bytes]");
        // 'é' is two bytes; the cut must not split it
        assert_eq!(truncate_body("aé", 2), "a[truncated 2 bytes]");
    }

    #[test]
    fn test_build_filter_defaults() {
        let config = LogConfig {
            service_name: "sheetsrv".to_string(),
            ..Default::default()
        };
        assert_eq!(build_filter(&config, None), "info,api_access=info");
    }

    #[test]
    fn test_build_filter_respects_rust_log() {
        let config = LogConfig::default();
        assert_eq!(
            build_filter(&config, Some("sheetsrv=debug")),
            "sheetsrv=debug,api_access=debug"
        );
        assert_eq!(
            build_filter(&config, Some("warn,api_access=off")),
            "warn,api_access=off"
        );

        let no_api = LogConfig {
            enable_api_log: false,
            ..Default::default()
        };
        assert_eq!(build_filter(&no_api, Some("warn")), "warn,api_access=off");
    }
}
