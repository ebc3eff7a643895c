use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::profile::DraftEntry;
use crate::profile::drafts::DraftRepository;
use crate::session::adapter::BrowserLauncher;
use crate::session::controller::{SessionController, SessionError};

/// Everything one interactive user session owns.
pub struct UserSession {
    pub user_id: Option<Uuid>,
    pub jobs: SessionController,
    pub drafts: DraftRepository<DraftEntry>,
}

impl UserSession {
    /// The logged-in user, or `PreconditionFailed` for an anonymous session.
    pub fn require_login(&self) -> Result<Uuid, SessionError> {
        self.user_id
            .ok_or(SessionError::PreconditionFailed("this action requires a logged-in user"))
    }

    /// Ends the login: releases the browser and forgets listing state and drafts.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.user_id = None;
        self.drafts.clear();
        self.jobs.close().await
    }
}

/// Locked per session so one session's actions run strictly one after another.
pub type SharedSession = Arc<tokio::sync::Mutex<UserSession>>;

struct Entry {
    session: SharedSession,
    last_used: Instant,
}

/// Live sessions keyed by id. Cloning shares the same map.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    launcher: Arc<dyn BrowserLauncher>,
    debug_path: Option<PathBuf>,
}

impl SessionRegistry {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, debug_path: Option<PathBuf>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            launcher,
            debug_path,
        }
    }

    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        let session = UserSession {
            user_id: None,
            jobs: SessionController::new(Arc::clone(&self.launcher), self.debug_path.clone()),
            drafts: DraftRepository::new(),
        };
        self.map().insert(
            id,
            Entry {
                session: Arc::new(tokio::sync::Mutex::new(session)),
                last_used: Instant::now(),
            },
        );
        info!("Session {id} opened");
        id
    }

    /// Looks up a session and marks it as used now.
    pub fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut map = self.map();
        let entry = map.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Removes the session and releases its browser handle.
    /// Returns `false` if no such session existed.
    pub async fn teardown(&self, id: Uuid) -> Result<bool, SessionError> {
        let Some(entry) = self.map().remove(&id) else {
            return Ok(false);
        };
        let mut session = entry.session.lock().await;
        session.logout().await?;
        info!("Session {id} torn down");
        Ok(true)
    }

    /// Tears down every session; used on shutdown.
    pub async fn close_all(&self) {
        let ids: Vec<Uuid> = self.map().keys().copied().collect();
        for id in ids {
            if let Err(e) = self.teardown(id).await {
                warn!("Session {id} did not release cleanly: {e}");
            }
        }
    }

    /// Tears down sessions not used for longer than `max_idle`.
    /// A session with an action in flight is skipped. Returns how many were removed.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let stale: Vec<Uuid> = self
            .map()
            .iter()
            .filter(|(_, entry)| entry.last_used.elapsed() > max_idle)
            .filter(|(_, entry)| entry.session.try_lock().is_ok())
            .map(|(id, _)| *id)
            .collect();

        let mut pruned = 0;
        for id in stale {
            match self.teardown(id).await {
                Ok(true) => {
                    info!("Session {id} expired after {}s idle", max_idle.as_secs());
                    pruned += 1;
                }
                Ok(false) => {}
                Err(e) => warn!("Idle session {id} did not release cleanly: {e}"),
            }
        }
        pruned
    }

    /// Spawns the background task that prunes idle sessions.
    pub fn spawn_idle_pruner(&self, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let pruned = registry.prune_idle(max_idle).await;
                if pruned > 0 {
                    debug!("Pruned {pruned} idle sessions, {} remain", registry.len());
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
