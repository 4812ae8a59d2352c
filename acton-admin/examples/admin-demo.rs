//! Example: An admin site over in-memory data
//!
//! Mounts two model view sets and a custom statistics page under `/admin`.
//! List pages support `?offset=&limit=`, `?sorting=-created_at,title` and,
//! for articles, `?query=` search.
//!
//! Run with: cargo run --example admin-demo
//! Then open http://localhost:8080/admin/

use acton_admin::prelude::*;
use chrono::{DateTime, Duration, TimeZone, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Article {
    slug: String,
    title: String,
    author: String,
    words: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Author {
    handle: String,
    name: String,
    bio: String,
}

fn seed_articles() -> Vec<Article> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    (0..42)
        .map(|i| Article {
            slug: format!("article-{i:02}"),
            title: format!("Field notes #{i}"),
            author: if i % 3 == 0 { "ada" } else { "grace" }.to_string(),
            words: 300 + (i * 137) % 900,
            created_at: start + Duration::days(i),
        })
        .collect()
}

fn seed_authors() -> Vec<Author> {
    vec![
        Author {
            handle: "ada".into(),
            name: "Ada Lovelace".into(),
            bio: "Writes about engines.".into(),
        },
        Author {
            handle: "grace".into(),
            name: "Grace Hopper".into(),
            bio: "Writes about compilers.".into(),
        },
    ]
}

fn articles(repository: InMemoryRepository<Article>) -> ModelViewSet<InMemoryRepository<Article>> {
    ModelViewSet::for_model(repository)
        .title("Articles")
        .primary_key(|a: &Article| a.slug.clone())
        .item_title(|a: &Article| a.title.clone())
        .list_fields([
            ("slug", "Slug"),
            ("title", "Title"),
            ("author", "Author"),
            ("words", "Words"),
            ("created_at", "Published"),
        ])
        .sortable_fields(["title", "words", "created_at"])
        .query_fields(["title", "author"])
        .default_limit(15)
        .edit_fields([
            FormField::text("title", "Title").required().max_length(120),
            FormField::integer("words", "Words").description("Approximate length"),
        ])
}

fn authors(repository: InMemoryRepository<Author>) -> ModelViewSet<InMemoryRepository<Author>> {
    ModelViewSet::for_model(repository)
        .title("Authors")
        .primary_key(|a: &Author| a.handle.clone())
        .item_title(|a: &Author| a.name.clone())
        .list_fields([("handle", "Handle"), ("name", "Name")])
        .edit_fields([
            FormField::text("name", "Name").required().min_length(2),
            FormField::textarea("bio", "Biography"),
        ])
}

fn stats(repository: InMemoryRepository<Article>) -> ViewSet {
    let stats = View::new("overview", "/").title("Overview").get(handler_fn(
        move |ctx: ViewContext| {
            let repository = repository.clone();
            async move {
                let articles = repository.snapshot().await;
                let words: i64 = articles.iter().map(|a| a.words).sum();
                let html = format!(
                    "<p>{} articles, {} words. <a href=\"{}\">Back</a></p>",
                    articles.len(),
                    words,
                    ctx.url_for("admin:index", &[])?
                );
                Ok::<_, Error>(Html(html))
            }
        },
    ));

    ViewSet::new("stats")
        .title("Statistics")
        .view(stats)
        .index_view("overview")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("admin-demo")?;
    init_tracing(&config)?;

    let article_repository = InMemoryRepository::new(seed_articles(), |a: &Article| a.slug.clone());
    let author_repository = InMemoryRepository::new(seed_authors(), |a: &Author| a.handle.clone());

    let site = AdminSite::from_config(&config.admin)
        .viewset(articles(article_repository.clone()))
        .viewset(authors(author_repository))
        .viewset(stats(article_repository))
        .build()?;

    info!(
        index = %site.url_for("admin:index", &[])?,
        "admin demo ready"
    );

    Server::new(config).serve(site.into_router()).await
}
