use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vowpage_core::error::CoreError;
use vowpage_core::repository::{validate_slug, Actor, ContentRepository, VersionedContent};
use vowpage_core::schema::{self, SchemaViolation};
use vowpage_core::types::Version;

use crate::error::ClientError;

const CSRF_HEADER: &str = "x-csrf-token";
const DEFAULT_CSRF_COOKIE: &str = "csrf_token";

/// Bearer token and CSRF pair sent with writes.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub csrf_token: String,
    pub csrf_cookie_name: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            csrf_token: csrf_token.into(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE.to_string(),
        }
    }
}

/// [`ContentRepository`] backed by a remote content API.
///
/// The writer's identity comes from the access token, so the [`Actor`]
/// passed to [`write`](ContentRepository::write) is not sent.
pub struct HttpContentRepository {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    slug: String,
    version: Version,
    content: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    content: &'a Value,
    expected_version: Version,
}

#[derive(Debug, Deserialize)]
struct SaveBody {
    version: Version,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    latest_version: Option<Version>,
    #[serde(default)]
    details: Vec<SchemaViolation>,
}

impl HttpContentRepository {
    /// * `base_url` - Server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: None,
        }
    }

    /// Attach credentials. Without them reads work and writes are rejected
    /// by the server.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn content_url(&self) -> String {
        format!("{}/api/v1/content", self.base_url)
    }

    pub async fn fetch(&self, slug: &str) -> Result<VersionedContent, ClientError> {
        let response = self
            .client
            .get(self.content_url())
            .query(&[("slug", slug)])
            .send()
            .await?;
        let body: ContentBody = Self::parse_response(response).await?;

        // The server already serves canonical content; normalizing again
        // turns it back into a typed document.
        let content = schema::normalize(&body.content).unwrap_or_else(|error| {
            tracing::warn!(
                slug = %body.slug,
                first = %error.summary(),
                "Server returned non-canonical content, using fallback document",
            );
            schema::fallback_document()
        });

        Ok(VersionedContent {
            slug: body.slug,
            version: body.version,
            content,
        })
    }

    pub async fn update(
        &self,
        slug: &str,
        expected_version: Version,
        candidate: &Value,
    ) -> Result<Version, ClientError> {
        let mut request = self
            .client
            .patch(self.content_url())
            .query(&[("slug", slug)])
            .json(&UpdateBody {
                content: candidate,
                expected_version,
            });
        if let Some(credentials) = &self.credentials {
            request = request
                .bearer_auth(&credentials.access_token)
                .header(CSRF_HEADER, &credentials.csrf_token)
                .header(
                    reqwest::header::COOKIE,
                    format!("{}={}", credentials.csrf_cookie_name, credentials.csrf_token),
                );
        }

        let body: SaveBody = Self::parse_response(request.send().await?).await?;
        Ok(body.version)
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into [`ClientError::Api`], reading the
    /// server's error envelope when there is one.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
            message: text,
            ..ErrorBody::default()
        });
        Err(ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            message: body.message,
            latest_version: body.latest_version,
            violations: body.details,
        })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ContentRepository for HttpContentRepository {
    async fn read(&self, slug: &str) -> Result<VersionedContent, CoreError> {
        validate_slug(slug)?;
        Ok(self.fetch(slug).await?)
    }

    async fn write(
        &self,
        slug: &str,
        expected_version: Version,
        candidate: &Value,
        _actor: Actor,
    ) -> Result<Version, CoreError> {
        validate_slug(slug)?;
        // Fail locally with field-level violations instead of a round trip.
        let normalized = schema::normalize(candidate)?;
        Ok(self
            .update(slug, expected_version, &normalized.to_value())
            .await?)
    }
}
