use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::infrastructure::utils::markdown::{estimate_read_time, safe_markdown_to_html};

/// A blog post document as the content store returns it. `content` is raw
/// Markdown; rendering happens in the use case layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub date: NaiveDate,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// A portfolio project document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub date: NaiveDate,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: Option<String>,
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

/// Listing view of a post: metadata plus a read-time estimate, body omitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: NaiveDate,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub author: String,
    pub read_time: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        PostView {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            date: post.date,
            category: post.category.clone(),
            tags: post.tags.clone(),
            featured: post.featured,
            author: post.author.clone(),
            read_time: estimate_read_time(post.content.as_deref().unwrap_or("")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
    pub total: usize,
}

/// Full post: listing metadata, rendered body, and related posts.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostView,
    pub content: String,
    pub related: Vec<PostView>,
}

impl PostDetailResponse {
    pub fn new(post: &Post, related: Vec<PostView>) -> Self {
        PostDetailResponse {
            post: PostView::from(post),
            content: safe_markdown_to_html(post.content.as_deref().unwrap_or("")),
            related,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub date: NaiveDate,
    pub category: String,
    pub tags: Vec<String>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        ProjectView {
            slug: project.slug.clone(),
            title: project.title.clone(),
            description: project.description.clone(),
            excerpt: project.excerpt.clone(),
            image: project.image.clone(),
            technologies: project.technologies.clone(),
            github_url: project.github_url.clone(),
            live_url: project.live_url.clone(),
            featured: project.featured,
            date: project.date,
            category: project.category.clone(),
            tags: project.tags.clone(),
        }
    }
}

/// Envelope returned by `GET /api/projects`, shaped for the front page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIndexResponse {
    pub all_projects: Vec<ProjectView>,
    pub featured_projects: Vec<ProjectView>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectView,
    pub content: String,
}

impl ProjectDetailResponse {
    pub fn new(project: &Project) -> Self {
        ProjectDetailResponse {
            project: ProjectView::from(project),
            content: safe_markdown_to_html(project.content.as_deref().unwrap_or("")),
        }
    }
}
