//! Process-local backend for development and tests.

use super::error::{StoreError, StoreResult};
use super::ports::{AuthProvider, ImageStorage, ProfileRepository, ProjectRepository, StoredImage};
use crate::config::TechnologySeed;
use crate::domain::{
    Identity, NewIdentity, NewProject, Project, ProjectChanges, ProjectFilter, ProjectImage, Role,
    Technology,
};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use folio_common_core::{ImageId, ProjectId, TechnologyId, Timestamp, UserId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

struct Account {
    id: UserId,
    password_hash: String,
    confirmed: bool,
}

/// Project row; tags are resolved against the catalogue on read.
#[derive(Clone)]
struct ProjectRow {
    project: Project,
    technology_ids: Vec<TechnologyId>,
}

struct StoredObject {
    bytes: Bytes,
    content_type: String,
}

/// In-memory tables behind all four ports.
pub struct MemoryBackend {
    accounts: DashMap<String, Account>,
    profiles: DashMap<UserId, Identity>,
    projects: DashMap<ProjectId, ProjectRow>,
    slugs: DashMap<String, ProjectId>,
    technologies: DashMap<TechnologyId, Technology>,
    objects: DashMap<String, StoredObject>,
    require_confirmation: AtomicBool,
    storage_calls: AtomicU64,
    public_base: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            profiles: DashMap::new(),
            projects: DashMap::new(),
            slugs: DashMap::new(),
            technologies: DashMap::new(),
            objects: DashMap::new(),
            require_confirmation: AtomicBool::new(false),
            storage_calls: AtomicU64::new(0),
            public_base: "memory://project-images".to_string(),
        }
    }

    /// New accounts start unconfirmed and cannot sign in until confirmed.
    pub fn with_email_confirmation(self) -> Self {
        self.require_confirmation.store(true, Ordering::Relaxed);
        self
    }

    /// Mark an account's email as confirmed.
    pub fn confirm_email(&self, email: &str) -> bool {
        match self.accounts.get_mut(&normalize_email(email)) {
            Some(mut account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Change a profile's role.
    pub fn set_role(&self, id: UserId, role: Role) -> bool {
        match self.profiles.get_mut(&id) {
            Some(mut profile) => {
                profile.role = role;
                profile.updated_at = Timestamp::now();
                true
            }
            None => false,
        }
    }

    /// Load the configured tag catalogue. Entries with a slug already in the
    /// catalogue are skipped.
    pub fn with_technologies(self, seeds: &[TechnologySeed]) -> Self {
        for seed in seeds {
            if self.technologies.iter().any(|t| t.slug == seed.slug) {
                continue;
            }
            self.insert_technology(Technology {
                id: TechnologyId::new(),
                name: seed.name.clone(),
                slug: seed.slug.clone(),
                icon: seed.icon.clone(),
                color: seed.color.clone(),
            });
        }
        self
    }

    /// Add a technology to the tag catalogue.
    pub fn seed_technology(&self, name: &str, slug: &str) -> Technology {
        self.insert_technology(Technology {
            id: TechnologyId::new(),
            name: name.to_string(),
            slug: slug.to_string(),
            icon: None,
            color: None,
        })
    }

    fn insert_technology(&self, technology: Technology) -> Technology {
        self.technologies.insert(technology.id, technology.clone());
        technology
    }

    /// The tag catalogue, by slug.
    pub fn technologies(&self) -> Vec<Technology> {
        let mut all: Vec<Technology> = self.technologies.iter().map(|t| t.clone()).collect();
        all.sort_by(|a, b| a.slug.cmp(&b.slug));
        all
    }

    /// Number of calls that reached the image bucket.
    pub fn storage_calls(&self) -> u64 {
        self.storage_calls.load(Ordering::Relaxed)
    }

    /// Size and content type of a stored object, if present.
    pub fn object(&self, path: &str) -> Option<(usize, String)> {
        self.objects
            .get(path)
            .map(|o| (o.bytes.len(), o.content_type.clone()))
    }

    fn resolve(&self, row: &ProjectRow) -> Project {
        let mut project = row.project.clone();
        project.technologies = row
            .technology_ids
            .iter()
            .filter_map(|id| self.technologies.get(id).map(|t| t.clone()))
            .collect();
        project
    }

    fn check_technologies(&self, ids: &[TechnologyId]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.technologies.contains_key(id)) {
            Some(missing) => Err(StoreError::Invalid(format!("unknown technology {missing}"))),
            None => Ok(()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(StoreError::upstream)
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str, _name: &str) -> StoreResult<UserId> {
        let password_hash = hash_password(password)?;
        let confirmed = !self.require_confirmation.load(Ordering::Relaxed);

        match self.accounts.entry(normalize_email(email)) {
            Entry::Occupied(_) => Err(StoreError::Conflict("email already registered".into())),
            Entry::Vacant(slot) => {
                let id = UserId::new();
                slot.insert(Account {
                    id,
                    password_hash,
                    confirmed,
                });
                debug!(user_id = %id, "Account created");
                Ok(id)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<UserId> {
        let account = self
            .accounts
            .get(&normalize_email(email))
            .ok_or(StoreError::InvalidCredentials)?;

        if !verify_password(&account.password_hash, password) {
            return Err(StoreError::InvalidCredentials);
        }
        if !account.confirmed {
            return Err(StoreError::EmailNotConfirmed);
        }
        Ok(account.id)
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn insert(&self, profile: NewIdentity) -> StoreResult<Identity> {
        if self
            .profiles
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(StoreError::Conflict("email already registered".into()));
        }

        match self.profiles.entry(profile.id) {
            Entry::Occupied(_) => Err(StoreError::Conflict("profile already exists".into())),
            Entry::Vacant(slot) => {
                let now = Timestamp::now();
                let identity = Identity {
                    id: profile.id,
                    email: profile.email,
                    name: profile.name,
                    role: profile.role,
                    avatar_url: profile.avatar_url,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(identity.clone());
                Ok(identity)
            }
        }
    }
}

#[async_trait]
impl ProjectRepository for MemoryBackend {
    async fn list(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = self.projects.iter().map(|r| r.clone()).collect();
        let mut projects: Vec<Project> = rows
            .iter()
            .map(|row| self.resolve(row))
            .filter(|p| filter.matches(p))
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Project>> {
        let id = match self.slugs.get(slug) {
            Some(id) => *id,
            None => return Ok(None),
        };
        ProjectRepository::find_by_id(self, id).await
    }

    async fn find_by_id(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        let row = self.projects.get(&id).map(|r| r.clone());
        Ok(row.map(|row| self.resolve(&row)))
    }

    async fn insert(&self, owner: UserId, project: NewProject) -> StoreResult<Project> {
        self.check_technologies(&project.technology_ids)?;

        let id = ProjectId::new();
        match self.slugs.entry(project.slug.clone()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict(format!("slug {}", project.slug)));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Timestamp::now();
        let mut images: Vec<ProjectImage> = project
            .images
            .into_iter()
            .map(|image| ProjectImage {
                id: ImageId::new(),
                url: image.url,
                alt_text: image.alt_text,
                is_main: image.is_main,
                order: image.order,
            })
            .collect();
        images.sort_by_key(|image| image.order);

        let row = ProjectRow {
            project: Project {
                id,
                slug: project.slug,
                title: project.title,
                description: project.description,
                long_description: project.long_description,
                is_featured: project.is_featured,
                user_id: owner,
                demo_url: project.demo_url,
                github_url: project.github_url,
                featured_image: project.featured_image,
                created_at: now,
                updated_at: now,
                technologies: Vec::new(),
                images,
            },
            technology_ids: project.technology_ids,
        };

        let resolved = self.resolve(&row);
        self.projects.insert(id, row);
        Ok(resolved)
    }

    async fn update(
        &self,
        _actor: UserId,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> StoreResult<Project> {
        if let Some(ids) = &changes.technology_ids {
            self.check_technologies(ids)?;
        }

        let current_slug = match self.projects.get(&id) {
            Some(row) => row.project.slug.clone(),
            None => return Err(StoreError::NotFound),
        };

        if let Some(new_slug) = changes.slug.as_ref().filter(|s| **s != current_slug) {
            match self.slugs.entry(new_slug.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Conflict(format!("slug {new_slug}"))),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.slugs.remove(&current_slug);
        }

        let row = {
            let mut row = self.projects.get_mut(&id).ok_or(StoreError::NotFound)?;
            changes.apply_to(&mut row.project);
            if let Some(ids) = changes.technology_ids {
                row.technology_ids = ids;
            }
            row.project.updated_at = Timestamp::now();
            row.clone()
        };
        Ok(self.resolve(&row))
    }

    async fn delete(&self, _actor: UserId, id: ProjectId) -> StoreResult<bool> {
        match self.projects.remove(&id) {
            Some((_, row)) => {
                self.slugs.remove(&row.project.slug);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ImageStorage for MemoryBackend {
    async fn upload(
        &self,
        _owner: UserId,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StoreResult<StoredImage> {
        self.storage_calls.fetch_add(1, Ordering::Relaxed);

        match self.objects.entry(path.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("object {path}"))),
            Entry::Vacant(slot) => {
                slot.insert(StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                });
                Ok(StoredImage {
                    url: format!("{}/{}", self.public_base, path),
                    path: path.to_string(),
                })
            }
        }
    }

    async fn remove(&self, _owner: UserId, path: &str) -> StoreResult<()> {
        self.storage_calls.fetch_add(1, Ordering::Relaxed);
        self.objects.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewProjectImage;

    fn new_project(slug: &str, technology_ids: Vec<TechnologyId>) -> NewProject {
        NewProject {
            slug: slug.to_string(),
            title: "Demo".to_string(),
            description: "A demo project".to_string(),
            long_description: None,
            is_featured: false,
            demo_url: None,
            github_url: None,
            featured_image: None,
            technology_ids,
            images: vec![NewProjectImage {
                url: "https://img.example/a.png".to_string(),
                alt_text: None,
                is_main: true,
                order: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let backend = MemoryBackend::new();
        let id = backend.sign_up("Ann@X.com", "secret1", "Ann").await.unwrap();

        assert_eq!(backend.sign_in("ann@x.com", "secret1").await.unwrap(), id);
        assert_eq!(
            backend.sign_in("ann@x.com", "wrong").await,
            Err(StoreError::InvalidCredentials)
        );
        assert_eq!(
            backend.sign_in("bob@x.com", "secret1").await,
            Err(StoreError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let backend = MemoryBackend::new();
        backend.sign_up("a@x.com", "secret1", "Ann").await.unwrap();

        let result = backend.sign_up("A@x.com", "secret2", "Ann").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unconfirmed_email() {
        let backend = MemoryBackend::new().with_email_confirmation();
        backend.sign_up("a@x.com", "secret1", "Ann").await.unwrap();

        assert_eq!(
            backend.sign_in("a@x.com", "secret1").await,
            Err(StoreError::EmailNotConfirmed)
        );
        assert!(backend.confirm_email("a@x.com"));
        assert!(backend.sign_in("a@x.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_slug_unique_and_released_on_delete() {
        let backend = MemoryBackend::new();
        let owner = UserId::new();
        let project = ProjectRepository::insert(&backend, owner, new_project("demo", vec![]))
            .await
            .unwrap();

        let again = ProjectRepository::insert(&backend, owner, new_project("demo", vec![])).await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));

        assert!(backend.delete(owner, project.id).await.unwrap());
        assert!(!backend.delete(owner, project.id).await.unwrap());
        assert!(
            ProjectRepository::insert(&backend, owner, new_project("demo", vec![]))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_update_replaces_tags_and_renames_slug() {
        let backend = MemoryBackend::new();
        let rust = backend.seed_technology("Rust", "rust");
        let go = backend.seed_technology("Go", "go");
        let owner = UserId::new();
        let project =
            ProjectRepository::insert(&backend, owner, new_project("demo", vec![rust.id]))
                .await
                .unwrap();
        assert_eq!(project.technologies, vec![rust.clone()]);

        let updated = backend
            .update(
                owner,
                project.id,
                ProjectChanges {
                    slug: Some("renamed".into()),
                    technology_ids: Some(vec![go.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.technologies, vec![go]);
        assert!(backend.find_by_slug("demo").await.unwrap().is_none());
        assert!(backend.find_by_slug("renamed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_configured_catalogue_accepts_tags() {
        let seeds = vec![
            TechnologySeed {
                name: "Rust".into(),
                slug: "rust".into(),
                icon: None,
                color: Some("#dea584".into()),
            },
            TechnologySeed {
                name: "Rust again".into(),
                slug: "rust".into(),
                icon: None,
                color: None,
            },
        ];
        let backend = MemoryBackend::new().with_technologies(&seeds);

        let catalogue = backend.technologies();
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue[0].color.as_deref(), Some("#dea584"));

        let project = ProjectRepository::insert(
            &backend,
            UserId::new(),
            new_project("demo", vec![catalogue[0].id]),
        )
        .await
        .unwrap();
        assert!(project.has_technology("rust"));
    }

    #[tokio::test]
    async fn test_unknown_technology_rejected() {
        let backend = MemoryBackend::new();
        let result = ProjectRepository::insert(
            &backend,
            UserId::new(),
            new_project("demo", vec![TechnologyId::new()]),
        )
        .await;
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_upload_does_not_overwrite() {
        let backend = MemoryBackend::new();
        let owner = UserId::new();
        let stored = backend
            .upload(owner, "u/1-a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        assert_eq!(stored.url, "memory://project-images/u/1-a.png");
        assert_eq!(backend.object("u/1-a.png"), Some((3, "image/png".to_string())));
        assert!(backend
            .upload(owner, "u/1-a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .is_err());
        assert_eq!(backend.storage_calls(), 2);
    }
}
