//! Project records.
//!
//! A project owns one conversation and one artifact. Both are created empty
//! with the project and go away with it.

use crate::identifier::{generate_project_id, now_utc};
use crate::messages::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to projects created without one.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// Description given to every new project.
pub const DEFAULT_PROJECT_DESCRIPTION: &str = "A new Shell Bay project";

/// A generated application and the chat that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// The artifact: current generated source.
    pub code: String,
    /// The conversation, oldest first.
    pub messages: Vec<ChatMessage>,
}

impl Project {
    /// Create an empty project with a fresh ID and the default description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_project_id(),
            name: name.into(),
            description: DEFAULT_PROJECT_DESCRIPTION.to_string(),
            created_at: now_utc(),
            code: String::new(),
            messages: Vec::new(),
        }
    }

    /// Create an empty project with the default name.
    #[must_use]
    pub fn untitled() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check whether the name or description contains `query`, ignoring case.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Partial update of a project's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
}

impl ProjectUpdate {
    /// Create an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Apply the update to a project.
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_untitled_project_is_empty() {
        let project = Project::untitled();
        assert_eq!(project.name, DEFAULT_PROJECT_NAME);
        assert_eq!(project.description, DEFAULT_PROJECT_DESCRIPTION);
        assert!(project.code.is_empty());
        assert!(project.messages.is_empty());
    }

    #[rstest]
    #[case("todo", true)]
    #[case("TODO", true)]
    #[case("kanban", true)]
    #[case("weather", false)]
    fn test_matches(#[case] query: &str, #[case] expected: bool) {
        let project = Project::new("Todo list").with_description("A kanban board");
        assert_eq!(project.matches(query), expected);
    }

    #[test]
    fn test_apply_update() {
        let mut project = Project::untitled();
        ProjectUpdate::new().name("Landing page").apply(&mut project);
        assert_eq!(project.name, "Landing page");
        assert_eq!(project.description, DEFAULT_PROJECT_DESCRIPTION);
    }

    #[test]
    fn test_serializes_camel_case() {
        let project = Project::untitled();
        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("createdAt").is_some());
    }
}
