//! Request data transfer objects.
//!
//! Every body is a closed struct: unknown fields are rejected and each one is
//! validated before any store call.

pub mod extract;

pub use extract::{ApiQuery, ValidatedJson};

use crate::domain::{NewProject, NewProjectImage, ProjectChanges, ProjectFilter};
use crate::error::ApiError;
use folio_common_core::TechnologyId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use validator::Validate;

/// Maximum slug length.
pub const SLUG_MAX: usize = 120;

/// Lowercase words joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));
    slug.len() <= SLUG_MAX && RE.is_match(slug)
}

/// Field errors beyond what the derive expresses.
#[derive(Default)]
struct FieldErrors(HashMap<String, Vec<String>>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(self.0))
        }
    }
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Image attached at project creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageInput {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub order: i32,
}

/// Project creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub slug: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    #[validate(url)]
    pub demo_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub github_url: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub technology_ids: Vec<TechnologyId>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

impl CreateProjectRequest {
    /// Checks the derive cannot express, then convert.
    pub fn into_new_project(self) -> Result<NewProject, ApiError> {
        let mut errors = FieldErrors::default();
        if !is_valid_slug(&self.slug) {
            errors.add("slug", "must be lowercase words separated by hyphens");
        }
        if self.images.iter().filter(|i| i.is_main).count() > 1 {
            errors.add("images", "at most one image may be main");
        }
        if self.images.iter().any(|i| url::Url::parse(&i.url).is_err()) {
            errors.add("images", "every image needs a valid url");
        }
        errors.into_result()?;

        Ok(NewProject {
            slug: self.slug,
            title: self.title,
            description: self.description,
            long_description: self.long_description,
            is_featured: self.is_featured,
            demo_url: self.demo_url,
            github_url: self.github_url,
            featured_image: self.featured_image,
            technology_ids: dedup(self.technology_ids),
            images: self
                .images
                .into_iter()
                .map(|i| NewProjectImage {
                    url: i.url,
                    alt_text: i.alt_text,
                    is_main: i.is_main,
                    order: i.order,
                })
                .collect(),
        })
    }
}

/// Keeps an explicit `null` apart from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial project update.
///
/// Absent fields stay as they are. The nullable columns accept `null`, which
/// clears them.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub long_description: Option<Option<String>>,
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub demo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub github_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub featured_image: Option<Option<String>>,
    pub technology_ids: Option<Vec<TechnologyId>>,
}

impl UpdateProjectRequest {
    pub fn into_changes(self) -> Result<ProjectChanges, ApiError> {
        let mut errors = FieldErrors::default();
        if let Some(slug) = &self.slug {
            if !is_valid_slug(slug) {
                errors.add("slug", "must be lowercase words separated by hyphens");
            }
        }
        for (field, value) in [
            ("demo_url", &self.demo_url),
            ("github_url", &self.github_url),
            ("featured_image", &self.featured_image),
        ] {
            if let Some(Some(url)) = value {
                if url::Url::parse(url).is_err() {
                    errors.add(field, "must be a valid url");
                }
            }
        }
        errors.into_result()?;

        let changes = ProjectChanges {
            slug: self.slug,
            title: self.title,
            description: self.description,
            long_description: self.long_description,
            is_featured: self.is_featured,
            demo_url: self.demo_url,
            github_url: self.github_url,
            featured_image: self.featured_image,
            technology_ids: self.technology_ids.map(dedup),
        };
        if changes.is_empty() {
            return Err(ApiError::BadRequest("update changes nothing".into()));
        }
        Ok(changes)
    }
}

fn dedup(mut ids: Vec<TechnologyId>) -> Vec<TechnologyId> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

/// Image removal request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteImageRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub path: String,
}

/// Project listing query.
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    #[serde(default)]
    pub featured: Option<String>,
    #[serde(default)]
    pub technology: Option<String>,
}

impl ListProjectsQuery {
    /// Only a literal `featured=true` turns the featured filter on.
    pub fn into_filter(self) -> ProjectFilter {
        ProjectFilter {
            featured_only: self.featured.as_deref() == Some("true"),
            technology_slug: self
                .technology
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(body: serde_json::Value) -> CreateProjectRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("demo"));
        assert!(is_valid_slug("my-demo-2"));
        assert!(!is_valid_slug("Demo"));
        assert!(!is_valid_slug("-demo"));
        assert!(!is_valid_slug("demo--two"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(&"a".repeat(SLUG_MAX + 1)));
    }

    #[test]
    fn test_register_validation() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "not-an-email", "password": "123", "name": ""
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_value::<LoginRequest>(json!({
            "email": "a@x.com", "password": "secret1", "role": "admin"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_defaults() {
        let project = create(json!({
            "title": "Demo", "slug": "demo", "description": "A demo"
        }))
        .into_new_project()
        .unwrap();

        assert!(!project.is_featured);
        assert!(project.technology_ids.is_empty());
        assert!(project.images.is_empty());
    }

    #[test]
    fn test_create_rejects_two_main_images() {
        let req = create(json!({
            "title": "Demo", "slug": "demo", "description": "A demo",
            "images": [
                {"url": "https://i/1.png", "is_main": true},
                {"url": "https://i/2.png", "is_main": true}
            ]
        }));

        match req.into_new_project() {
            Err(ApiError::ValidationError(fields)) => assert!(fields.contains_key("images")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_bad_slug_and_url() {
        let req = create(json!({
            "title": "Demo", "slug": "Bad Slug", "description": "A demo",
            "demo_url": "not a url"
        }));

        assert!(req.validate().is_err());
        assert!(matches!(req.into_new_project(), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_empty_update_rejected() {
        let result = UpdateProjectRequest::default().into_changes();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_update_null_clears_and_absent_keeps() {
        let req: UpdateProjectRequest = serde_json::from_value(json!({
            "demo_url": null,
            "github_url": "https://github.com/a/demo"
        }))
        .unwrap();
        let changes = req.into_changes().unwrap();

        assert_eq!(changes.demo_url, Some(None));
        assert_eq!(
            changes.github_url,
            Some(Some("https://github.com/a/demo".to_string()))
        );
        assert_eq!(changes.long_description, None);
        assert_eq!(changes.featured_image, None);
    }

    #[test]
    fn test_update_rejects_bad_url() {
        let req: UpdateProjectRequest =
            serde_json::from_value(json!({"featured_image": "not a url"})).unwrap();

        match req.into_changes() {
            Err(ApiError::ValidationError(fields)) => assert!(fields.contains_key("featured_image")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_update_dedups_technologies() {
        let id = TechnologyId::new();
        let changes = UpdateProjectRequest {
            technology_ids: Some(vec![id, id]),
            ..Default::default()
        }
        .into_changes()
        .unwrap();

        assert_eq!(changes.technology_ids, Some(vec![id]));
    }

    #[test]
    fn test_list_query_filter() {
        let filter = ListProjectsQuery {
            featured: Some("true".into()),
            technology: Some(" rust ".into()),
        }
        .into_filter();
        assert!(filter.featured_only);
        assert_eq!(filter.technology_slug.as_deref(), Some("rust"));

        let off = ListProjectsQuery {
            featured: Some("yes".into()),
            technology: Some("".into()),
        }
        .into_filter();
        assert!(!off.featured_only);
        assert!(off.technology_slug.is_none());
    }
}
