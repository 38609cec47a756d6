mod error;

pub use error::{ApiError, ApiResult};

use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{NewProject, Project, ProjectPatch};

/// HTTP client for the remote project collection.
///
/// All six operations are plain request/response calls with JSON bodies;
/// the server is the sole authority for project ids.
#[derive(Debug, Clone)]
pub struct ProjectApi {
    http_client: HttpClient,
    base_url: Url,
}

impl ProjectApi {
    /// Create a new client against the given base URL.
    pub fn new(base_url: Url) -> Self {
        let http_client = HttpClient::builder()
            .user_agent("project-manager-tui/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url,
        }
    }

    /// Create a client from a base URL string, e.g. `http://localhost:4000/api`.
    pub fn from_url(base_url: &str) -> ApiResult<Self> {
        // A trailing slash makes relative endpoint paths extend the base
        // instead of replacing its last segment on join.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)?;
        Ok(Self::new(base_url))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the full project collection.
    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        let url = self.endpoint("projects")?;
        self.get(url).await
    }

    /// Fetch a single project by id.
    pub async fn get_one(&self, id: i64) -> ApiResult<Project> {
        let url = self.endpoint(&format!("projects/{id}"))?;
        self.get(url).await
    }

    /// Create a project. The returned entry carries the server-assigned id.
    pub async fn create(&self, project: &NewProject) -> ApiResult<Project> {
        let url = self.endpoint("projects")?;
        let created: Project = self.send(self.http_client.post(url).json(project)).await?;
        if created.id <= 0 {
            return Err(ApiError::MissingId);
        }
        Ok(created)
    }

    /// Update a project. Unset patch fields stay unchanged on the server;
    /// the response is the full updated project.
    pub async fn update(&self, id: i64, patch: &ProjectPatch) -> ApiResult<Project> {
        let url = self.endpoint(&format!("projects/{id}"))?;
        self.send(self.http_client.put(url).json(patch)).await
    }

    /// Delete a project by id. The server confirms with no body worth keeping.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let url = self.endpoint(&format!("projects/{id}"))?;
        let response = self.http_client.delete(url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Free-text search over the collection. Match semantics are owned by
    /// the remote side.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Project>> {
        let mut url = self.endpoint("projects/search")?;
        url.query_pairs_mut().append_pair("str", query);
        self.get(url).await
    }

    // Private helper methods

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        self.send(self.http_client.get(url)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ApiError::from)
    }

    async fn check_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }
}
