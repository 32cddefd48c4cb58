//! Portfolio projects and their tags and images.

use folio_common_core::{ImageId, ProjectId, TechnologyId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A technology tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub id: TechnologyId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// An image attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: ImageId,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub order: i32,
}

/// A project with its tags and images resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub is_featured: bool,
    pub user_id: UserId,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub technologies: Vec<Technology>,
    pub images: Vec<ProjectImage>,
}

impl Project {
    /// Ownership facts the authorization check needs.
    pub fn ownership(&self) -> Ownership {
        Ownership {
            project_id: self.id,
            owner: self.user_id,
        }
    }

    pub fn has_technology(&self, slug: &str) -> bool {
        self.technologies.iter().any(|t| t.slug == slug)
    }
}

/// Who owns which project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub project_id: ProjectId,
    pub owner: UserId,
}

/// Image to attach when creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProjectImage {
    pub url: String,
    pub alt_text: Option<String>,
    pub is_main: bool,
    pub order: i32,
}

/// Validated project payload for inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub is_featured: bool,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured_image: Option<String>,
    pub technology_ids: Vec<TechnologyId>,
    pub images: Vec<NewProjectImage>,
}

/// Validated partial update. `None` leaves the column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<Option<String>>,
    pub is_featured: Option<bool>,
    pub demo_url: Option<Option<String>>,
    pub github_url: Option<Option<String>>,
    pub featured_image: Option<Option<String>>,
    /// Replaces the whole tag set when present.
    pub technology_ids: Option<Vec<TechnologyId>>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the column changes to a project in place.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(slug) = &self.slug {
            project.slug = slug.clone();
        }
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(long) = &self.long_description {
            project.long_description = long.clone();
        }
        if let Some(featured) = self.is_featured {
            project.is_featured = featured;
        }
        if let Some(url) = &self.demo_url {
            project.demo_url = url.clone();
        }
        if let Some(url) = &self.github_url {
            project.github_url = url.clone();
        }
        if let Some(url) = &self.featured_image {
            project.featured_image = url.clone();
        }
    }
}

/// Conjunctive listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub featured_only: bool,
    pub technology_slug: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if self.featured_only && !project.is_featured {
            return false;
        }
        match &self.technology_slug {
            Some(slug) => project.has_technology(slug),
            None => true,
        }
    }
}
