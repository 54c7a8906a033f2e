use crate::{
    entities::content::{
        PostDetailResponse, PostListResponse, PostView, ProjectDetailResponse,
        ProjectIndexResponse, ProjectView,
    },
    errors::AppError,
    infrastructure::content::sanity::ContentStore,
};

const RELATED_POSTS_LIMIT: usize = 3;

pub struct ContentHandler<S>
where
    S: ContentStore,
{
    store: S,
}

impl<S> ContentHandler<S>
where
    S: ContentStore,
{
    pub fn new(store: S) -> Self {
        ContentHandler { store }
    }

    /// Lists posts, newest first, optionally narrowed to one category or to
    /// featured posts only.
    pub async fn list_posts(
        &self,
        category: Option<&str>,
        featured_only: bool,
    ) -> Result<PostListResponse, AppError> {
        let posts = self.store.list_posts().await?;

        let posts: Vec<PostView> = posts
            .iter()
            .filter(|p| {
                category.is_none_or(|c| p.category.eq_ignore_ascii_case(c))
                    && (!featured_only || p.featured)
            })
            .map(PostView::from)
            .collect();

        let total = posts.len();
        Ok(PostListResponse { posts, total })
    }

    /// A single post with its body rendered to sanitized HTML, plus up to
    /// three related posts from the same category.
    pub async fn get_post(&self, slug: &str) -> Result<PostDetailResponse, AppError> {
        let post = self
            .store
            .get_post(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

        let related: Vec<PostView> = self
            .store
            .list_posts()
            .await?
            .iter()
            .filter(|p| p.slug != post.slug && p.category == post.category)
            .take(RELATED_POSTS_LIMIT)
            .map(PostView::from)
            .collect();

        Ok(PostDetailResponse::new(&post, related))
    }

    /// The project index envelope the front page renders: everything plus
    /// the featured subset, derived from a single fetch.
    pub async fn project_index(&self) -> Result<ProjectIndexResponse, AppError> {
        let projects = self.store.list_projects().await?;

        let all_projects: Vec<ProjectView> = projects.iter().map(ProjectView::from).collect();
        let featured_projects = all_projects
            .iter()
            .filter(|p| p.featured)
            .cloned()
            .collect();

        Ok(ProjectIndexResponse {
            all_projects,
            featured_projects,
        })
    }

    pub async fn get_project(&self, slug: &str) -> Result<ProjectDetailResponse, AppError> {
        let project = self
            .store
            .get_project(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        Ok(ProjectDetailResponse::new(&project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::content::{Post, Project};
    use crate::infrastructure::content::sanity::MockContentStore;
    use chrono::NaiveDate;

    fn post(slug: &str, category: &str, featured: bool) -> Post {
        Post {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            excerpt: "excerpt".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            category: category.to_string(),
            tags: vec!["rust".to_string()],
            featured,
            author: "Me".to_string(),
            content: Some("# Heading\n\nBody text here.".to_string()),
        }
    }

    fn project(slug: &str, featured: bool) -> Project {
        Project {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: "desc".to_string(),
            excerpt: "excerpt".to_string(),
            image: None,
            technologies: vec!["rust".to_string()],
            github_url: None,
            live_url: None,
            featured,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            category: "web".to_string(),
            tags: vec![],
            content: Some("Details".to_string()),
        }
    }

    #[tokio::test]
    async fn listing_filters_by_category_case_insensitively() {
        let mut store = MockContentStore::new();
        store.expect_list_posts().returning(|| {
            Ok(vec![
                post("a", "Rust", false),
                post("b", "rust", true),
                post("c", "Life", false),
            ])
        });
        let handler = ContentHandler::new(store);

        let listing = handler.list_posts(Some("rust"), false).await.unwrap();
        assert_eq!(listing.total, 2);
        assert!(listing.posts.iter().all(|p| p.category.eq_ignore_ascii_case("rust")));
    }

    #[tokio::test]
    async fn featured_filter_drops_everything_else() {
        let mut store = MockContentStore::new();
        store
            .expect_list_posts()
            .returning(|| Ok(vec![post("a", "Rust", false), post("b", "Rust", true)]));
        let handler = ContentHandler::new(store);

        let listing = handler.list_posts(None, true).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.posts[0].slug, "b");
    }

    #[tokio::test]
    async fn post_detail_renders_markdown_and_related() {
        let mut store = MockContentStore::new();
        store
            .expect_get_post()
            .returning(|slug| Ok(Some(post(slug, "Rust", false))));
        store.expect_list_posts().returning(|| {
            Ok(vec![
                post("a", "Rust", false),
                post("b", "Rust", false),
                post("c", "Life", false),
            ])
        });
        let handler = ContentHandler::new(store);

        let detail = handler.get_post("a").await.unwrap();
        assert!(detail.content.contains("<h1>"));
        let related: Vec<&str> = detail.related.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(related, vec!["b"]);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let mut store = MockContentStore::new();
        store.expect_get_post().returning(|_| Ok(None));
        let handler = ContentHandler::new(store);

        let err = handler.get_post("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn project_index_partitions_featured() {
        let mut store = MockContentStore::new();
        store
            .expect_list_projects()
            .returning(|| Ok(vec![project("a", true), project("b", false)]));
        let handler = ContentHandler::new(store);

        let index = handler.project_index().await.unwrap();
        assert_eq!(index.all_projects.len(), 2);
        assert_eq!(index.featured_projects.len(), 1);
        assert_eq!(index.featured_projects[0].slug, "a");
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let mut store = MockContentStore::new();
        store.expect_get_project().returning(|_| Ok(None));
        let handler = ContentHandler::new(store);

        assert!(matches!(
            handler.get_project("ghost").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
