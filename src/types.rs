use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Merge request state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Locked,
    Merged,
    All,
}

impl MergeRequestState {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MergeRequestState::Opened => "opened",
            MergeRequestState::Closed => "closed",
            MergeRequestState::Locked => "locked",
            MergeRequestState::Merged => "merged",
            MergeRequestState::All => "all",
        }
    }
}

/// Merge request scope filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRequestScope {
    /// Every project the token can see, not just the caller's own requests
    All,
}

impl MergeRequestScope {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MergeRequestScope::All => "all",
        }
    }
}

/// Filters for the `GET /merge_requests` listing. Unset fields are omitted
/// from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListMergeRequestsOptions {
    pub state: Option<MergeRequestState>,
    pub scope: Option<MergeRequestScope>,
    pub author_id: Option<u64>,
    pub author_username: Option<String>,
    pub assignee_username: Option<String>,
    pub approver_ids: Vec<u64>,
    pub approver_usernames: Vec<String>,
}

impl ListMergeRequestsOptions {
    /// Open requests authored by `user_id`, across every project.
    pub fn authored_by(user_id: u64) -> Self {
        Self {
            state: Some(MergeRequestState::Opened),
            scope: Some(MergeRequestScope::All),
            author_id: Some(user_id),
            ..Default::default()
        }
    }

    /// Open requests where `user_id` is an eligible approver.
    pub fn approvable_by(user_id: u64) -> Self {
        Self {
            state: Some(MergeRequestState::Opened),
            scope: Some(MergeRequestScope::All),
            approver_ids: vec![user_id],
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(state) = self.state {
            pairs.push(("state", state.as_api_str().to_string()));
        }
        if let Some(scope) = self.scope {
            pairs.push(("scope", scope.as_api_str().to_string()));
        }
        if let Some(id) = self.author_id {
            pairs.push(("author_id", id.to_string()));
        }
        if let Some(name) = &self.author_username {
            pairs.push(("author_username", name.clone()));
        }
        if let Some(name) = &self.assignee_username {
            pairs.push(("assignee_username", name.clone()));
        }
        for id in &self.approver_ids {
            pairs.push(("approver_ids[]", id.to_string()));
        }
        for name in &self.approver_usernames {
            pairs.push(("approver_usernames[]", name.clone()));
        }
        pairs
    }
}

/// GitLab merge request as returned by the REST API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: Option<MergeRequestState>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_by: Option<User>,
    pub closed_by: Option<User>,
    pub target_branch: String,
    pub source_branch: String,
    pub user_notes_count: u64,
    pub upvotes: u64,
    pub downvotes: u64,
    pub author: Option<User>,
    pub assignees: Vec<User>,
    pub labels: Vec<String>,
    pub draft: bool,
    pub milestone: Option<Milestone>,
    pub merge_status: Option<String>,
    pub sha: Option<String>,
    pub references: Option<References>,
    pub web_url: String,
    pub squash: bool,
    pub task_completion_status: Option<TaskCompletionStatus>,
    pub has_conflicts: bool,
    pub blocking_discussions_resolved: bool,
}

impl MergeRequest {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("unknown")
    }

    pub fn full_reference(&self) -> &str {
        self.references
            .as_ref()
            .map(|r| r.full.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub state: String,
    pub avatar_url: Option<String>,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct References {
    pub short: String,
    pub relative: String,
    pub full: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub state: String,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskCompletionStatus {
    pub count: u64,
    pub completed_count: u64,
}
