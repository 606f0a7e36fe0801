//! Per-session dashboard state.
//!
//! A session holds the latest completed snapshot and the status of the query
//! in flight. Each query takes a ticket; only the most recently issued ticket
//! may publish, so a slow earlier query never overwrites a newer one.
//! Readers always see either the previous snapshot or the new one, never a
//! partially built result.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::GlobalSouthSeries;
use crate::pipeline::{CitationView, CoauthorView};

/// Session timeout after which sessions are cleaned up.
const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Cleanup interval for stale sessions.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Immutable result of one dashboard query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "dashboard", rename_all = "snake_case")]
pub enum Snapshot {
    /// Clinical-trial citations.
    Citations(CitationView),
    /// Global-South ratio series.
    GlobalSouth(GlobalSouthSeries),
    /// Co-author network.
    Coauthors(CoauthorView),
}

impl Snapshot {
    /// Name of the dashboard that produced this snapshot.
    #[must_use]
    pub const fn dashboard(&self) -> &'static str {
        match self {
            Self::Citations(_) => "clinical_trials",
            Self::GlobalSouth(_) => "global_south",
            Self::Coauthors(_) => "coauthor_network",
        }
    }
}

/// Progress of the latest query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum QueryStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A query is running.
    InProgress,
    /// The latest query published a snapshot.
    Done,
    /// The latest query failed with a user-facing message.
    Failed(String),
}

impl QueryStatus {
    /// Message shown next to the dashboard.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::InProgress => "Search in progress...",
            Self::Done => "Done",
            Self::Failed(message) => message,
        }
    }
}

/// Token for one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
}

impl QueryTicket {
    /// Sequence number of the query within its session.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct SessionState {
    snapshot: Option<Arc<Snapshot>>,
    status: QueryStatus,
    latest: u64,
}

/// One dashboard session.
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    state: RwLock<SessionState>,
    next_generation: AtomicU64,
    /// When the session was created.
    pub created_at: Instant,
    last_active: RwLock<Instant>,
}

impl Session {
    /// Create a new session.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            state: RwLock::new(SessionState::default()),
            next_generation: AtomicU64::new(1),
            created_at: Instant::now(),
            last_active: RwLock::new(Instant::now()),
        }
    }

    /// Register a new query; it supersedes any query still running.
    pub async fn begin_query(&self) -> QueryTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        {
            let mut state = self.state.write().await;
            state.latest = generation;
            state.status = QueryStatus::InProgress;
        }
        self.touch().await;
        QueryTicket { generation }
    }

    /// Replace the snapshot if `ticket` is still the latest query.
    ///
    /// Returns the published snapshot, or `None` if the ticket was superseded.
    pub async fn publish(&self, ticket: QueryTicket, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let mut state = self.state.write().await;
        if state.latest != ticket.generation {
            tracing::warn!(
                session_id = %self.id,
                ticket = ticket.generation,
                latest = state.latest,
                "Discarding result of superseded query"
            );
            return None;
        }
        let snapshot = Arc::new(snapshot);
        state.snapshot = Some(Arc::clone(&snapshot));
        state.status = QueryStatus::Done;
        Some(snapshot)
    }

    /// Mark the latest query as failed. The previous snapshot stays visible.
    ///
    /// Returns `false` if the ticket was superseded.
    pub async fn fail(&self, ticket: QueryTicket, message: impl Into<String>) -> bool {
        let mut state = self.state.write().await;
        if state.latest != ticket.generation {
            return false;
        }
        state.status = QueryStatus::Failed(message.into());
        true
    }

    /// Latest published snapshot.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.snapshot.clone()
    }

    /// Status of the latest query.
    pub async fn status(&self) -> QueryStatus {
        self.state.read().await.status.clone()
    }

    /// Check if session is stale.
    pub async fn is_stale(&self) -> bool {
        let last_active = *self.last_active.read().await;
        last_active.elapsed() > SESSION_TIMEOUT
    }

    /// Update last activity timestamp.
    pub async fn touch(&self) {
        *self.last_active.write().await = Instant::now();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("next_generation", &self.next_generation.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Registry of live sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionManager {
    /// Create a new session manager.
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Create a new session.
    pub async fn create_session(&self) -> Arc<Session> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone()));

        self.sessions.write().await.insert(id, Arc::clone(&session));

        tracing::info!(session_id = %session.id, "Created new session");
        session
    }

    /// Get an existing session by ID.
    pub async fn get_session(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Get or create a session.
    pub async fn get_or_create_session(&self, id: Option<&str>) -> Arc<Session> {
        if let Some(id) = id {
            if let Some(session) = self.get_session(id).await {
                session.touch().await;
                return session;
            }
        }
        self.create_session().await
    }

    /// Remove a session.
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    /// Clean up stale sessions.
    pub async fn cleanup_stale_sessions(&self) -> usize {
        let mut to_remove = Vec::new();

        {
            let sessions = self.sessions.read().await;
            for (id, session) in sessions.iter() {
                if session.is_stale().await {
                    to_remove.push(id.clone());
                }
            }
        }

        let count = to_remove.len();
        if count > 0 {
            let mut sessions = self.sessions.write().await;
            for id in to_remove {
                sessions.remove(&id);
                tracing::info!(session_id = %id, "Cleaned up stale session");
            }
        }

        count
    }

    /// Get session count.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Start background cleanup task.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let cleaned = self.cleanup_stale_sessions().await;
                if cleaned > 0 {
                    tracing::debug!(count = cleaned, "Session cleanup completed");
                }
            }
        });
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearlyRatio;

    fn series(year: i32) -> Snapshot {
        Snapshot::GlobalSouth(GlobalSouthSeries {
            years: vec![year],
            institution_ids: Vec::new(),
            global: vec![YearlyRatio { year, numerator: 1, denominator: 2, percentage: Some(50.0) }],
            local: None,
        })
    }

    fn snapshot_year(snapshot: &Snapshot) -> Option<i32> {
        match snapshot {
            Snapshot::GlobalSouth(s) => s.years.first().copied(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_session_creation() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        assert!(!session.id.is_empty());
        assert_eq!(manager.session_count().await, 1);
        assert_eq!(session.status().await, QueryStatus::Idle);
    }

    #[tokio::test]
    async fn test_latest_query_wins() {
        let session = Session::new("test".to_string());

        let slow = session.begin_query().await;
        let fast = session.begin_query().await;

        assert!(session.publish(fast, series(2024)).await.is_some());
        // The older query finishes last and must not overwrite.
        assert!(session.publish(slow, series(2020)).await.is_none());

        let current = session.snapshot().await;
        assert_eq!(current.as_deref().and_then(snapshot_year), Some(2024));
        assert_eq!(session.status().await, QueryStatus::Done);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let session = Session::new("test".to_string());

        let first = session.begin_query().await;
        session.publish(first, series(2023)).await;

        let second = session.begin_query().await;
        assert_eq!(session.status().await.message(), "Search in progress...");
        assert!(session.fail(second, "Invalid DOI or no data available").await);

        assert_eq!(session.snapshot().await.as_deref().and_then(snapshot_year), Some(2023));
        assert_eq!(
            session.status().await,
            QueryStatus::Failed("Invalid DOI or no data available".to_string())
        );
    }

    #[tokio::test]
    async fn test_stale_failure_ignored() {
        let session = Session::new("test".to_string());
        let old = session.begin_query().await;
        let _new = session.begin_query().await;

        assert!(!session.fail(old, "boom").await);
        assert_eq!(session.status().await, QueryStatus::InProgress);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        let same = manager.get_or_create_session(Some(&session.id)).await;
        assert_eq!(same.id, session.id);

        let fresh = manager.get_or_create_session(Some("unknown")).await;
        assert_ne!(fresh.id, session.id);
        assert_eq!(manager.session_count().await, 2);

        assert!(manager.remove_session(&fresh.id).await);
        assert!(!manager.remove_session(&fresh.id).await);
    }

    #[test]
    fn test_tickets_are_monotonic() {
        tokio_test::block_on(async {
            let session = Session::new("test".to_string());
            let a = session.begin_query().await;
            let b = session.begin_query().await;
            assert!(b.generation() > a.generation());
        });
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(QueryStatus::Failed("x".into())).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "x");
    }
}
