use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent with every outgoing request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for all web-based services
///
/// Initialized lazily on first access and reused for every dispatch, so
/// concurrent sends to the same host share pooled connections.
///
/// # Features
/// - **Compression**: gzip, deflate, brotli and zstd responses
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **Timeouts**: 30s request timeout, 10s connect timeout
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
///
/// A client that cannot be built (broken TLS backend) falls back to the
/// reqwest defaults.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        // Compression
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        // Security
        .https_only(false)
        .use_rustls_tls()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to build tuned HTTP client, using defaults");
            reqwest::Client::new()
        })
});

/// Turns a non-success response into a transport error carrying the body
pub async fn check_response(service: &str, response: reqwest::Response) -> crate::error::AppResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(crate::error::AppError::Transport {
        service: service.to_string(),
        reason: if body.is_empty() {
            format!("server returned {}", status)
        } else {
            format!("server returned {}: {}", status, body.trim())
        },
    })
}
