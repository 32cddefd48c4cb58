//! Adapter for a hosted Supabase project.
//!
//! Speaks three REST dialects over one `reqwest` client: the auth service
//! under `/auth/v1`, the row API under `/rest/v1` and object storage under
//! `/storage/v1`.
//!
//! Reads and auth calls use the anon key. Every write is signed for the acting
//! user (see [`scope`]), so the row-level security policies in
//! `supabase/schema.sql` hold the same owner and admin rules as the gateway.
//! Multi-row writes are issued one after another without a transaction: a
//! failure part way leaves the earlier rows in place, and ownership can change
//! between the gateway's check and the write.

mod rows;
mod scope;

use self::rows::*;
use self::scope::RowSigner;
use super::error::{StoreError, StoreResult};
use super::ports::{AuthProvider, ImageStorage, ProfileRepository, ProjectRepository, StoredImage};
use crate::config::BackendConfig;
use crate::domain::{Identity, NewIdentity, NewProject, Project, ProjectChanges, ProjectFilter};
use async_trait::async_trait;
use bytes::Bytes;
use folio_common_core::{ProjectId, TechnologyId, UserId};
use folio_common_http::{headers, parse_json, HttpClient, HttpError, RequestBuilder};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

const RETURN_REPRESENTATION: &str = "return=representation";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: HttpClient,
    /// Anon-key headers for auth calls and reads.
    public: RequestBuilder,
    /// Service role headers for uploads, when that key is configured.
    uploads: Option<RequestBuilder>,
    /// Signs writes as the acting user.
    signer: Option<RowSigner>,
    base_url: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> Result<Self, HttpError> {
        Ok(Self::with_http(config, HttpClient::new()?))
    }

    pub fn with_http(config: &BackendConfig, http: HttpClient) -> Self {
        let base_url = config.url.trim_end_matches('/').to_string();
        let anon = config.anon_key.expose();

        let public = RequestBuilder::new()
            .base_url(&base_url)
            .api_key(anon)
            .bearer_auth(anon);
        let uploads = config
            .service_role_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                RequestBuilder::new()
                    .base_url(&base_url)
                    .api_key(key.expose())
                    .bearer_auth(key.expose())
            });
        let signer = config
            .jwt_secret
            .as_ref()
            .filter(|secret| !secret.is_empty())
            .map(RowSigner::new);

        Self {
            http,
            public,
            uploads,
            signer,
            base_url,
            bucket: config.storage_bucket.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .inner()
            .request(method, self.public.url(path))
            .headers(self.public.headers().clone())
    }

    /// A request authenticated as `actor` rather than as the anon key.
    fn scoped(
        &self,
        method: Method,
        path: &str,
        actor: UserId,
    ) -> StoreResult<reqwest::RequestBuilder> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            StoreError::Upstream("writes need backend.jwt_secret to be configured".into())
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", signer.token_for(actor)?))
            .map_err(StoreError::upstream)?;

        let mut headers = self.public.headers().clone();
        headers.insert(AUTHORIZATION, bearer);
        Ok(self
            .http
            .inner()
            .request(method, self.public.url(path))
            .headers(headers))
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> StoreResult<Vec<T>> {
        let response = self.http.send(request).await.map_err(rest_error)?;
        parse_json(response).await.map_err(StoreError::upstream)
    }

    async fn insert_rows<B: Serialize + ?Sized>(
        &self,
        actor: UserId,
        table: &str,
        body: &B,
    ) -> StoreResult<()> {
        let request = self
            .scoped(Method::POST, &format!("/rest/v1/{table}"), actor)?
            .json(body);
        self.http.send(request).await.map_err(rest_error)?;
        Ok(())
    }

    async fn project_where(&self, column: &str, value: &str) -> StoreResult<Option<Project>> {
        let eq = format!("eq.{value}");
        let request = self
            .request(Method::GET, "/rest/v1/projects")
            .query(&[("select", PROJECT_SELECT), (column, eq.as_str())]);
        let rows: Vec<ProjectRow> = self.rows(request).await?;
        Ok(rows.into_iter().next().map(Project::from))
    }

    async fn link_technologies(
        &self,
        actor: UserId,
        project_id: ProjectId,
        ids: &[TechnologyId],
    ) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let links: Vec<TechnologyLinkInsert> = ids
            .iter()
            .map(|&technology_id| TechnologyLinkInsert {
                project_id,
                technology_id,
            })
            .collect();
        self.insert_rows(actor, "project_technologies", &links).await
    }
}

/// Map an auth-service failure.
fn auth_error(err: HttpError) -> StoreError {
    let status = match err.status() {
        Some(status) if status < 500 => status,
        _ => return StoreError::upstream(err),
    };
    let body: AuthErrorBody = err
        .body()
        .and_then(|b| serde_json::from_str(b).ok())
        .unwrap_or_default();
    let code = body.error_code.as_deref().unwrap_or_default();
    let message = body.message();

    if code == "email_not_confirmed" || message.contains("Email not confirmed") {
        StoreError::EmailNotConfirmed
    } else if code == "invalid_credentials"
        || body.error.as_deref() == Some("invalid_grant")
        || message.contains("Invalid login credentials")
    {
        StoreError::InvalidCredentials
    } else if code == "user_already_exists" || code == "email_exists" || status == 422 {
        StoreError::Conflict(message)
    } else {
        StoreError::Invalid(message)
    }
}

/// Map a row-API or storage failure.
fn rest_error(err: HttpError) -> StoreError {
    let status = match err.status() {
        Some(status) if status < 500 => status,
        _ => return StoreError::upstream(err),
    };
    let body: RestErrorBody = err
        .body()
        .and_then(|b| serde_json::from_str(b).ok())
        .unwrap_or_default();
    let message = body
        .message
        .unwrap_or_else(|| err.body().unwrap_or_default().to_string());

    match body.code.as_deref() {
        Some(UNIQUE_VIOLATION) => StoreError::Conflict(message),
        Some(FOREIGN_KEY_VIOLATION) => StoreError::Invalid(message),
        _ if status == 409 => StoreError::Conflict(message),
        _ if status == 404 => StoreError::NotFound,
        _ if status == 401 || status == 403 => {
            warn!(status, code = ?body.code, "Store refused the request");
            StoreError::Upstream(message)
        }
        _ => StoreError::Invalid(message),
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> StoreResult<UserId> {
        let request = self
            .request(Method::POST, "/auth/v1/signup")
            .json(&SignUpBody {
                email,
                password,
                data: SignUpMetadata { name },
            });
        let response = self.http.send(request).await.map_err(auth_error)?;
        let body: SignUpResponse = parse_json(response).await.map_err(StoreError::upstream)?;

        body.user_id()
            .ok_or_else(|| StoreError::Upstream("sign-up response carried no user".into()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<UserId> {
        let request = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password });
        let response = self.http.send(request).await.map_err(auth_error)?;
        let body: TokenResponse = parse_json(response).await.map_err(StoreError::upstream)?;
        Ok(body.user.id)
    }
}

#[async_trait]
impl ProfileRepository for SupabaseClient {
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        let eq = format!("eq.{id}");
        let request = self
            .request(Method::GET, "/rest/v1/profiles")
            .query(&[("select", "*"), ("id", eq.as_str())]);
        let rows: Vec<Identity> = self.rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, profile: NewIdentity) -> StoreResult<Identity> {
        let request = self
            .scoped(Method::POST, "/rest/v1/profiles", profile.id)?
            .header(headers::PREFER, RETURN_REPRESENTATION)
            .json(&[&profile]);
        let rows: Vec<Identity> = self.rows(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Upstream("profile insert returned no row".into()))
    }
}

#[async_trait]
impl ProjectRepository for SupabaseClient {
    async fn list(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let mut request = self
            .request(Method::GET, "/rest/v1/projects")
            .query(&[("select", PROJECT_SELECT), ("order", "created_at.desc")]);
        if filter.featured_only {
            request = request.query(&[("is_featured", "eq.true")]);
        }

        let rows: Vec<ProjectRow> = self.rows(request).await?;
        Ok(rows
            .into_iter()
            .map(Project::from)
            .filter(|p| filter.matches(p))
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Project>> {
        self.project_where("slug", slug).await
    }

    async fn find_by_id(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        self.project_where("id", &id.to_string()).await
    }

    async fn insert(&self, owner: UserId, project: NewProject) -> StoreResult<Project> {
        let request = self
            .scoped(Method::POST, "/rest/v1/projects", owner)?
            .header(headers::PREFER, RETURN_REPRESENTATION)
            .json(&[ProjectInsert::new(owner, &project)]);
        let rows: Vec<IdRow> = self.rows(request).await?;
        let id = rows
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| StoreError::Upstream("project insert returned no row".into()))?;

        self.link_technologies(owner, id, &project.technology_ids).await?;

        if !project.images.is_empty() {
            let images: Vec<ImageInsert> = project
                .images
                .iter()
                .map(|image| ImageInsert {
                    project_id: id,
                    url: &image.url,
                    alt_text: image.alt_text.as_deref(),
                    is_main: image.is_main,
                    order: image.order,
                })
                .collect();
            self.insert_rows(owner, "project_images", &images).await?;
        }

        debug!(project_id = %id, "Project rows written");
        ProjectRepository::find_by_id(self, id)
            .await?
            .ok_or_else(|| StoreError::Upstream("project vanished after insert".into()))
    }

    async fn update(
        &self,
        actor: UserId,
        id: ProjectId,
        changes: ProjectChanges,
    ) -> StoreResult<Project> {
        let filter = format!("eq.{id}");

        // Always patched so a tags-only change still bumps `updated_at`.
        let request = self
            .scoped(Method::PATCH, "/rest/v1/projects", actor)?
            .query(&[("id", &filter)])
            .header(headers::PREFER, RETURN_REPRESENTATION)
            .json(&ProjectPatch::from(&changes));
        let rows: Vec<IdRow> = self.rows(request).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound);
        }

        if let Some(ids) = &changes.technology_ids {
            let request = self
                .scoped(Method::DELETE, "/rest/v1/project_technologies", actor)?
                .query(&[("project_id", &filter)]);
            self.http.send(request).await.map_err(rest_error)?;
            self.link_technologies(actor, id, ids).await?;
        }

        ProjectRepository::find_by_id(self, id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, actor: UserId, id: ProjectId) -> StoreResult<bool> {
        let request = self
            .scoped(Method::DELETE, "/rest/v1/projects", actor)?
            .query(&[("id", format!("eq.{id}"))])
            .header(headers::PREFER, RETURN_REPRESENTATION);
        let rows: Vec<IdRow> = self.rows(request).await?;
        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> StoreResult<()> {
        let request = self
            .request(Method::GET, "/rest/v1/projects")
            .query(&[("select", "id"), ("limit", "1")]);
        self.http.send(request).await.map_err(rest_error)?;
        Ok(())
    }
}

#[async_trait]
impl ImageStorage for SupabaseClient {
    async fn upload(
        &self,
        owner: UserId,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StoreResult<StoredImage> {
        let object = format!("/storage/v1/object/{}/{}", self.bucket, path);
        let request = match &self.uploads {
            Some(uploads) => self
                .http
                .inner()
                .post(uploads.url(&object))
                .headers(uploads.headers().clone()),
            None => self.scoped(Method::POST, &object, owner)?,
        };
        let request = request
            .header(CONTENT_TYPE, content_type)
            .header(headers::X_UPSERT, "false")
            .body(bytes);
        self.http.send(request).await.map_err(rest_error)?;

        Ok(StoredImage {
            url: self.public_url(path),
            path: path.to_string(),
        })
    }

    async fn remove(&self, owner: UserId, path: &str) -> StoreResult<()> {
        let request = self
            .scoped(
                Method::DELETE,
                &format!("/storage/v1/object/{}", self.bucket),
                owner,
            )?
            .json(&RemoveObjects { prefixes: [path] });
        self.http.send(request).await.map_err(rest_error)?;
        Ok(())
    }
}
