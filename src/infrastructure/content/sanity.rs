use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{
    entities::content::{Post, Project},
    errors::AppError,
    settings::AppConfig,
};

const POST_FIELDS: &str = r#"{
  "slug": slug.current, title, excerpt, author, date, category, tags, featured, content
}"#;

const PROJECT_FIELDS: &str = r#"{
  "slug": slug.current, title, description, excerpt, "image": image.asset->url,
  technologies, githubUrl, liveUrl, featured, date, category, tags, content
}"#;

/// Read access to the hosted document store. Posts and projects are keyed by
/// a unique slug and listed in publish-date-descending order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>, AppError>;
    async fn get_post(&self, slug: &str) -> Result<Option<Post>, AppError>;
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn get_project(&self, slug: &str) -> Result<Option<Project>, AppError>;
}

/// Sanity Content Lake client speaking the HTTP GROQ query API.
#[derive(Clone)]
pub struct SanityStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct QueryEnvelope<T> {
    result: T,
}

impl SanityStore {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        let host = if config.sanity_use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let base_url = format!(
            "https://{}.{}/v{}/data/query/{}",
            config.sanity_project_id, host, config.sanity_api_version, config.sanity_dataset
        );
        Self { client, base_url }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        slug_param: Option<&str>,
    ) -> Result<T, AppError> {
        let mut url = format!("{}?query={}", self.base_url, urlencoding::encode(groq));
        if let Some(slug) = slug_param {
            // GROQ parameters are passed JSON-encoded in the query string.
            let quoted = format!("\"{}\"", slug.replace('\\', "\\\\").replace('"', "\\\""));
            url.push_str("&%24slug=");
            url.push_str(&urlencoding::encode(&quoted));
        }

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "content store query failed: {body}");
            return Err(AppError::Internal(format!(
                "content store answered with status {status}"
            )));
        }

        let envelope: QueryEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("malformed content store response: {e}")))?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl ContentStore for SanityStore {
    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let groq = format!(r#"*[_type == "post"] | order(date desc){POST_FIELDS}"#);
        let posts: Option<Vec<Post>> = self.query(&groq, None).await?;
        Ok(posts.unwrap_or_default())
    }

    async fn get_post(&self, slug: &str) -> Result<Option<Post>, AppError> {
        let groq = format!(r#"*[_type == "post" && slug.current == $slug][0]{POST_FIELDS}"#);
        self.query(&groq, Some(slug)).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let groq = format!(r#"*[_type == "project"] | order(date desc){PROJECT_FIELDS}"#);
        let projects: Option<Vec<Project>> = self.query(&groq, None).await?;
        Ok(projects.unwrap_or_default())
    }

    async fn get_project(&self, slug: &str) -> Result<Option<Project>, AppError> {
        let groq = format!(r#"*[_type == "project" && slug.current == $slug][0]{PROJECT_FIELDS}"#);
        self.query(&groq, Some(slug)).await
    }
}
