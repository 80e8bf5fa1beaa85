//! Project persistence boundary.
//!
//! The chat session never touches storage directly; every read and write of
//! a project's conversation and artifact goes through [`ProjectStore`].

use crate::error::StoreError;
use async_trait::async_trait;
use shellbay_core::{ChatMessage, Project, ProjectUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage trait for projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Save a new project.
    async fn create_project(&self, project: Project) -> Result<Project, StoreError>;

    /// Get a project by ID.
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StoreError>;

    /// List all projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Projects whose name or description contains `query`, ignoring case.
    /// An empty query matches everything.
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>, StoreError> {
        let query = query.trim();
        let projects = self.list_projects().await?;
        if query.is_empty() {
            return Ok(projects);
        }
        Ok(projects.into_iter().filter(|p| p.matches(query)).collect())
    }

    /// Change a project's name or description.
    async fn update_project(
        &self,
        project_id: &str,
        update: ProjectUpdate,
    ) -> Result<Project, StoreError>;

    /// Delete a project together with its conversation and artifact.
    async fn delete_project(&self, project_id: &str) -> Result<(), StoreError>;

    /// Append a message to a project's conversation.
    async fn append_message(&self, project_id: &str, message: ChatMessage)
        -> Result<(), StoreError>;

    /// Replace a project's artifact.
    async fn replace_code(&self, project_id: &str, code: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    project: Project,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    projects: HashMap<String, Entry>,
}

/// In-memory project store.
///
/// Suitable for development and testing; data is lost when the process
/// exits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryProjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub async fn len(&self) -> usize {
        self.inner.read().await.projects.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.projects.is_empty()
    }

    /// Remove every project.
    pub async fn clear(&self) {
        self.inner.write().await.projects.clear();
    }

    async fn with_project<F, T>(&self, project_id: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Project) -> T + Send,
    {
        let mut inner = self.inner.write().await;
        let entry = inner
            .projects
            .get_mut(project_id)
            .ok_or_else(|| StoreError::NotFound(project_id.to_string()))?;
        Ok(f(&mut entry.project))
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.projects.contains_key(&project.id) {
            return Err(StoreError::AlreadyExists(project.id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.projects.insert(
            project.id.clone(),
            Entry {
                seq,
                project: project.clone(),
            },
        );
        Ok(project)
    }

    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.projects.get(project_id).map(|e| e.project.clone()))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&Entry> = inner.projects.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(entries.into_iter().map(|e| e.project.clone()).collect())
    }

    async fn update_project(
        &self,
        project_id: &str,
        update: ProjectUpdate,
    ) -> Result<Project, StoreError> {
        self.with_project(project_id, move |project| {
            update.apply(project);
            project.clone()
        })
        .await
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.projects.remove(project_id).is_none() {
            return Err(StoreError::NotFound(project_id.to_string()));
        }
        Ok(())
    }

    async fn append_message(
        &self,
        project_id: &str,
        message: ChatMessage,
    ) -> Result<(), StoreError> {
        self.with_project(project_id, move |project| project.messages.push(message))
            .await
    }

    async fn replace_code(&self, project_id: &str, code: String) -> Result<(), StoreError> {
        self.with_project(project_id, move |project| project.code = code)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shellbay_core::DEFAULT_PROJECT_NAME;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryProjectStore::new();
        let project = store.create_project(Project::untitled()).await.unwrap();

        let loaded = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, DEFAULT_PROJECT_NAME);
        assert!(loaded.code.is_empty());
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate() {
        let store = InMemoryProjectStore::new();
        let project = Project::untitled();
        store.create_project(project.clone()).await.unwrap();

        let result = store.create_project(project).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryProjectStore::new();
        let first = store.create_project(Project::new("first")).await.unwrap();
        let second = store.create_project(Project::new("second")).await.unwrap();

        let ids: Vec<String> = store
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_search() {
        let store = InMemoryProjectStore::new();
        store
            .create_project(Project::new("Todo app").with_description("kanban"))
            .await
            .unwrap();
        store.create_project(Project::new("Weather")).await.unwrap();

        assert_eq!(store.search_projects("KANBAN").await.unwrap().len(), 1);
        assert_eq!(store.search_projects("weath").await.unwrap().len(), 1);
        assert_eq!(store.search_projects("  ").await.unwrap().len(), 2);
        assert!(store.search_projects("chess").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_replace() {
        let store = InMemoryProjectStore::new();
        let project = store.create_project(Project::untitled()).await.unwrap();

        store
            .append_message(&project.id, ChatMessage::user("hello"))
            .await
            .unwrap();
        store
            .replace_code(&project.id, "const x = 1;".into())
            .await
            .unwrap();

        let loaded = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.code, "const x = 1;");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryProjectStore::new();
        let project = store.create_project(Project::untitled()).await.unwrap();

        let updated = store
            .update_project(&project.id, ProjectUpdate::new().name("Portfolio"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Portfolio");

        tokio_test::assert_ok!(store.delete_project(&project.id).await);
        assert!(store.get_project(&project.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_project(&project.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.replace_code(&project.id, String::new()).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
