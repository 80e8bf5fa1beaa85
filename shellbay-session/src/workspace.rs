//! Project lifecycle and session registry.

use crate::chat::ProjectChat;
use crate::error::WorkspaceError;
use crate::factory::{DefaultGeneratorFactory, GeneratorFactory};
use crate::session::ChatSession;
use crate::store::{InMemoryProjectStore, ProjectStore};
use parking_lot::Mutex;
use shellbay_core::{CredentialSource, Project, ProjectUpdate};
use shellbay_retries::RetryConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Owns the project store and one [`ChatSession`] per opened project.
///
/// Sessions for different projects are independent and may generate
/// concurrently.
pub struct Workspace {
    store: Arc<dyn ProjectStore>,
    credentials: Arc<dyn CredentialSource>,
    factory: Arc<dyn GeneratorFactory>,
    retry: RetryConfig,
    sessions: Mutex<HashMap<String, Arc<ChatSession>>>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("open_sessions", &self.sessions.lock().len())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Create a workspace over a store, using the built-in generators.
    pub fn new(store: Arc<dyn ProjectStore>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            store,
            credentials,
            factory: Arc::new(DefaultGeneratorFactory::new()),
            retry: RetryConfig::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a workspace backed by an [`InMemoryProjectStore`].
    pub fn in_memory(credentials: Arc<dyn CredentialSource>) -> Self {
        Self::new(Arc::new(InMemoryProjectStore::new()), credentials)
    }

    /// Use a different generator factory for sessions opened afterwards.
    #[must_use]
    pub fn with_factory(mut self, factory: impl GeneratorFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Retry policy for sessions opened afterwards.
    #[must_use]
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    /// Create a project. A missing or blank name gets the default name.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn create_project(&self, name: Option<&str>) -> Result<Project, WorkspaceError> {
        let project = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Project::new(name),
            None => Project::untitled(),
        };
        let project = self.store.create_project(project).await?;
        info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Get a project.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>, WorkspaceError> {
        Ok(self.store.get_project(project_id).await?)
    }

    /// All projects, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn list_projects(&self) -> Result<Vec<Project>, WorkspaceError> {
        Ok(self.store.list_projects().await?)
    }

    /// Projects whose name or description matches `query`.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn search_projects(&self, query: &str) -> Result<Vec<Project>, WorkspaceError> {
        Ok(self.store.search_projects(query).await?)
    }

    /// Rename or redescribe a project.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub async fn update_project(
        &self,
        project_id: &str,
        update: ProjectUpdate,
    ) -> Result<Project, WorkspaceError> {
        Ok(self.store.update_project(project_id, update).await?)
    }

    /// The session for a project, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// project does not exist.
    pub async fn open(&self, project_id: &str) -> Result<Arc<ChatSession>, WorkspaceError> {
        if let Some(session) = self.sessions.lock().get(project_id) {
            return Ok(Arc::clone(session));
        }

        let chat = ProjectChat::load(project_id, Arc::clone(&self.store)).await?;
        let session = ChatSession::new(
            Arc::new(chat),
            Arc::clone(&self.credentials),
            Arc::clone(&self.factory),
        )
        .with_retry(self.retry.clone());

        // Another caller may have loaded it while we were reading the store.
        let mut sessions = self.sessions.lock();
        let session = sessions
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(session));
        Ok(Arc::clone(session))
    }

    /// Delete a project, its conversation and its artifact.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Busy`] while the project is generating, or
    /// the store error.
    pub async fn delete_project(&self, project_id: &str) -> Result<(), WorkspaceError> {
        let session = self.sessions.lock().get(project_id).cloned();

        match &session {
            Some(session) => {
                let _reserved = session
                    .chat()
                    .try_reserve()
                    .ok_or_else(|| WorkspaceError::Busy(project_id.to_string()))?;
                self.store.delete_project(project_id).await?;
                self.sessions.lock().remove(project_id);
            }
            None => self.store.delete_project(project_id).await?,
        }

        info!(project_id, "Project deleted");
        Ok(())
    }

    /// Number of loaded sessions.
    pub fn open_sessions(&self) -> usize {
        self.sessions.lock().len()
    }
}
