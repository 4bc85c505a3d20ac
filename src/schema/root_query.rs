//! Root query fields.

use std::time::{Duration, Instant};

use async_graphql::Object;

/// The canonical health-check answer other systems match on.
pub const HEALTHY_STATUS: &str = "Service is healthy";

/// API version reported by the `version` field.
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Format used by the `serverTime` field (RFC 1123).
pub const SERVER_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S UTC";

pub struct QueryRoot {
    started_at: Instant,
}

impl QueryRoot {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Default for QueryRoot {
    fn default() -> Self {
        Self::new()
    }
}

#[Object]
impl QueryRoot {
    /// Get the status of the GraphQL API
    async fn status(&self) -> &str {
        HEALTHY_STATUS
    }

    /// Get the uptime of the server
    async fn uptime(&self) -> String {
        format_uptime(self.started_at.elapsed())
    }

    /// Get the current version of the GraphQL API
    async fn version(&self) -> &str {
        VERSION
    }

    /// Get the current server time
    async fn server_time(&self) -> String {
        chrono::Utc::now().format(SERVER_TIME_FORMAT).to_string()
    }
}

/// Render a duration as `1h2m3s`, `2m3s`, `3s`, or `250ms` below one second.
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        return format!("{}ms", elapsed.as_millis());
    }

    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
