use hashlink::LruCache;
use serde::{Deserialize, Serialize};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// Per-caller request budget for the search endpoint.
pub const RATE_LIMIT_MAX: usize = 30;
/// Length of the rate limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Upper bound on distinct callers tracked at once. Stale callers fall off
/// the LRU end, so an open endpoint cannot grow the table without bound.
const CALLER_TABLE_CAP: usize = 128;

/// Why a search produced no results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The caller used up its request budget for the current window.
    RateLimited,
    /// The endpoint rejected the credentials (or their absence).
    Unauthorized,
    /// The endpoint answered, but not with results.
    Upstream(String),
    /// The request never completed.
    Transport(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::RateLimited => write!(f, "search limit reached, try again in a minute"),
            SearchError::Unauthorized => write!(f, "sign in to search videos"),
            SearchError::Upstream(msg) => write!(f, "search failed: {msg}"),
            SearchError::Transport(msg) => write!(f, "search request failed: {msg}"),
        }
    }
}

impl std::error::Error for SearchError {}

/// One row of a search response, already normalized by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: String,
}

/// Fixed-window rate limiter keyed by caller id.
///
/// Each check prunes the caller's log down to the window, then either admits
/// and records the request or rejects it. Rejected requests are not recorded,
/// so hammering a closed window does not push the window forward.
pub struct RateLimiter {
    max: usize,
    window: Duration,
    callers: LruCache<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            max,
            window,
            callers: LruCache::new(CALLER_TABLE_CAP),
        }
    }

    /// Admit or reject a request from `caller` at time `now`. The clock is a
    /// parameter so tests can drive it.
    pub fn check(&mut self, caller: &str, now: Instant) -> bool {
        if self.callers.get_mut(caller).is_none() {
            self.callers.insert(caller.to_string(), Vec::new());
        }
        let Some(log) = self.callers.get_mut(caller) else {
            return false;
        };
        log.retain(|t| now.saturating_duration_since(*t) < self.window);
        if log.len() >= self.max {
            tracing::debug!(%caller, "rate limit hit");
            return false;
        }
        log.push(now);
        true
    }
}

/// Blocking client for the video search endpoint.
///
/// Lives behind [`SearchService`] on worker threads; nothing here runs on the
/// UI thread. No request timeout is configured, matching the service side; a
/// slow request occupies its worker and nothing else.
pub struct SearchClient {
    http: reqwest::blocking::Client,
    endpoint: Url,
    caller_id: String,
    auth_token: Option<String>,
    limiter: Mutex<RateLimiter>,
}

impl SearchClient {
    pub fn new(
        endpoint: &str,
        caller_id: impl Into<String>,
        auth_token: Option<String>,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("eduscreen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            caller_id: caller_id.into(),
            auth_token,
            limiter: Mutex::new(RateLimiter::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW)),
        })
    }

    pub fn search(&self, query: &str) -> Result<Vec<VideoResult>, SearchError> {
        {
            let mut limiter = self
                .limiter
                .lock()
                .map_err(|_| SearchError::Transport("rate limiter poisoned".into()))?;
            if !limiter.check(&self.caller_id, Instant::now()) {
                return Err(SearchError::RateLimited);
            }
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);
        let mut request = self.http.get(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SearchError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::Upstream(format!(
                "endpoint returned {status}"
            )));
        }
        response
            .json::<Vec<VideoResult>>()
            .map_err(|e| SearchError::Upstream(format!("malformed response: {e}")))
    }
}

/// Handle for running searches off the UI thread.
#[derive(Clone, Default)]
pub struct SearchService {
    client: Option<Arc<SearchClient>>,
}

impl SearchService {
    pub fn new(client: SearchClient) -> Self {
        Self {
            client: Some(Arc::new(client)),
        }
    }

    /// Service without an endpoint; every search fails with a transport
    /// error explaining the missing configuration.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Start a search on a worker thread and return a task to poll.
    pub fn spawn_search(&self, query: String) -> SearchTask {
        let (tx, rx) = mpsc::channel();
        match &self.client {
            None => {
                let _ = tx.send(Err(SearchError::Transport(
                    "video search is not configured".into(),
                )));
            }
            Some(client) => {
                let client = Arc::clone(client);
                std::thread::spawn(move || {
                    tracing::debug!(%query, "video search");
                    let _ = tx.send(client.search(&query));
                });
            }
        }
        SearchTask { rx }
    }
}

/// An in-flight search. Poll once per frame until it yields.
pub struct SearchTask {
    rx: mpsc::Receiver<Result<Vec<VideoResult>, SearchError>>,
}

impl SearchTask {
    pub fn poll(&self) -> Option<Result<Vec<VideoResult>, SearchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(SearchError::Transport(
                "search worker disappeared".into(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_inside_the_window_are_counted() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check("a", start));
        assert!(limiter.check("a", start + Duration::from_secs(1)));
        assert!(limiter.check("a", start + Duration::from_secs(2)));
        assert!(!limiter.check("a", start + Duration::from_secs(3)));
    }

    #[test]
    fn the_window_slides_per_request() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check("a", start));
        assert!(limiter.check("a", start + Duration::from_secs(30)));
        assert!(!limiter.check("a", start + Duration::from_secs(59)));
        // The first request has aged out; one slot is free again.
        assert!(limiter.check("a", start + Duration::from_secs(61)));
        assert!(!limiter.check("a", start + Duration::from_secs(62)));
    }

    #[test]
    fn rejected_requests_do_not_extend_the_window() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check("a", start));
        for i in 1..10 {
            assert!(!limiter.check("a", start + Duration::from_secs(i)));
        }
        assert!(limiter.check("a", start + Duration::from_secs(11)));
    }

    #[test]
    fn callers_are_limited_independently() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check("alice", now));
        assert!(limiter.check("bob", now));
        assert!(!limiter.check("alice", now));
    }

    #[test]
    fn default_budget_matches_the_endpoint() {
        let mut limiter = RateLimiter::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW);
        let now = Instant::now();
        for _ in 0..RATE_LIMIT_MAX {
            assert!(limiter.check("room-12", now));
        }
        assert!(!limiter.check("room-12", now));
    }

    #[test]
    fn unconfigured_service_fails_fast() {
        let service = SearchService::disabled();
        assert!(!service.is_configured());
        let task = service.spawn_search("fractions".into());
        match task.poll() {
            Some(Err(SearchError::Transport(msg))) => {
                assert!(msg.contains("not configured"));
            }
            other => panic!("unexpected poll result: {other:?}"),
        }
    }

    #[test]
    fn bad_endpoint_urls_are_rejected_up_front() {
        assert!(SearchClient::new("not a url", "caller", None).is_err());
        assert!(SearchClient::new("https://example.test/search", "caller", None).is_ok());
    }

    #[test]
    fn video_rows_deserialize_with_missing_extras() {
        let json = r#"[{"id": "abc123", "title": "Fractions 101"}]"#;
        let rows: Vec<VideoResult> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].id, "abc123");
        assert_eq!(rows[0].thumbnail, "");
        assert_eq!(rows[0].duration, "");
    }
}
