//! Wire shapes of the hosted store's REST dialects.

use crate::domain::{NewProject, Project, ProjectChanges, ProjectImage, Technology};
use folio_common_core::{ProjectId, TechnologyId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Embedded select used for every project read.
pub const PROJECT_SELECT: &str =
    "*,project_technologies(technology_id,technologies(*)),project_images(*)";

#[derive(Debug, Serialize)]
pub struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub struct SignUpMetadata<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
}

/// Sign-up answers with a session when auto-confirm is on and with the bare
/// user otherwise.
#[derive(Debug, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub id: Option<UserId>,
}

impl SignUpResponse {
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id).or(self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub user: AuthUser,
}

/// Error body of the auth service. Older deployments use `error` and
/// `error_description`, newer ones `error_code` and `msg`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl AuthErrorBody {
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "auth request rejected".to_string())
    }
}

/// Error body of the row API.
#[derive(Debug, Default, Deserialize)]
pub struct RestErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TechnologyLink {
    #[serde(default)]
    pub technologies: Option<Technology>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub user_id: UserId,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub project_technologies: Vec<TechnologyLink>,
    #[serde(default)]
    pub project_images: Vec<ProjectImage>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let mut images = row.project_images;
        images.sort_by_key(|image| image.order);

        Project {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            long_description: row.long_description,
            is_featured: row.is_featured,
            user_id: row.user_id,
            demo_url: row.demo_url,
            github_url: row.github_url,
            featured_image: row.featured_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            technologies: row
                .project_technologies
                .into_iter()
                .filter_map(|link| link.technologies)
                .collect(),
            images,
        }
    }
}

/// Row id returned by inserts and deletes.
#[derive(Debug, Deserialize)]
pub struct IdRow {
    pub id: ProjectId,
}

#[derive(Debug, Serialize)]
pub struct ProjectInsert<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub long_description: Option<&'a str>,
    pub is_featured: bool,
    pub user_id: UserId,
    pub demo_url: Option<&'a str>,
    pub github_url: Option<&'a str>,
    pub featured_image: Option<&'a str>,
}

impl<'a> ProjectInsert<'a> {
    pub fn new(owner: UserId, project: &'a NewProject) -> Self {
        Self {
            slug: &project.slug,
            title: &project.title,
            description: &project.description,
            long_description: project.long_description.as_deref(),
            is_featured: project.is_featured,
            user_id: owner,
            demo_url: project.demo_url.as_deref(),
            github_url: project.github_url.as_deref(),
            featured_image: project.featured_image.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    /// `Some(None)` serializes as `null` and clears the column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Option<&'a str>>,
    pub updated_at: Timestamp,
}

impl<'a> From<&'a ProjectChanges> for ProjectPatch<'a> {
    fn from(changes: &'a ProjectChanges) -> Self {
        Self {
            slug: changes.slug.as_deref(),
            title: changes.title.as_deref(),
            description: changes.description.as_deref(),
            long_description: nullable(&changes.long_description),
            is_featured: changes.is_featured,
            demo_url: nullable(&changes.demo_url),
            github_url: nullable(&changes.github_url),
            featured_image: nullable(&changes.featured_image),
            updated_at: Timestamp::now(),
        }
    }
}

fn nullable(value: &Option<Option<String>>) -> Option<Option<&str>> {
    value.as_ref().map(|inner| inner.as_deref())
}

#[derive(Debug, Serialize)]
pub struct TechnologyLinkInsert {
    pub project_id: ProjectId,
    pub technology_id: TechnologyId,
}

#[derive(Debug, Serialize)]
pub struct ImageInsert<'a> {
    pub project_id: ProjectId,
    pub url: &'a str,
    pub alt_text: Option<&'a str>,
    pub is_main: bool,
    pub order: i32,
}

#[derive(Debug, Serialize)]
pub struct RemoveObjects<'a> {
    pub prefixes: [&'a str; 1],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_row_flattens_embeds() {
        let tech_id = TechnologyId::new();
        let row: ProjectRow = serde_json::from_value(json!({
            "id": ProjectId::new(),
            "slug": "demo",
            "title": "Demo",
            "description": "A demo",
            "is_featured": true,
            "user_id": UserId::new(),
            "created_at": "2024-05-01T10:00:00.123456+00:00",
            "updated_at": "2024-05-01T10:00:00+00:00",
            "project_technologies": [
                {"technology_id": tech_id, "technologies": {"id": tech_id, "name": "Rust", "slug": "rust"}}
            ],
            "project_images": [
                {"id": uuid::Uuid::new_v4(), "url": "https://i/2.png", "is_main": false, "order": 2},
                {"id": uuid::Uuid::new_v4(), "url": "https://i/1.png", "is_main": true, "order": 1}
            ]
        }))
        .unwrap();

        let project = Project::from(row);
        assert!(project.has_technology("rust"));
        assert_eq!(project.images[0].url, "https://i/1.png");
        assert!(project.long_description.is_none());
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let id = UserId::new();
        let session: SignUpResponse =
            serde_json::from_value(json!({"access_token": "t", "user": {"id": id}})).unwrap();
        let bare: SignUpResponse =
            serde_json::from_value(json!({"id": id, "email": "a@x.com"})).unwrap();

        assert_eq!(session.user_id(), Some(id));
        assert_eq!(bare.user_id(), Some(id));
    }

    #[test]
    fn test_patch_skips_untouched_columns() {
        let changes = ProjectChanges {
            title: Some("New".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(ProjectPatch::from(&changes)).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["title"], "New");
        assert!(!object.contains_key("slug"));
        assert!(object.contains_key("updated_at"));
    }

    #[test]
    fn test_patch_sends_null_to_clear_a_column() {
        let changes = ProjectChanges {
            demo_url: Some(None),
            github_url: Some(Some("https://github.com/a/demo".into())),
            ..Default::default()
        };
        let value = serde_json::to_value(ProjectPatch::from(&changes)).unwrap();
        let object = value.as_object().unwrap();

        assert!(object["demo_url"].is_null());
        assert_eq!(object["github_url"], "https://github.com/a/demo");
        assert!(!object.contains_key("long_description"));
    }
}
