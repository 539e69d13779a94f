//! Database queries for news articles.

use sqlx::PgPool;

use super::types::{CreateNewsRequest, NewsArticle, UpdateNewsRequest};

/// Articles newest first, optionally limited to one category.
pub async fn list_news(pool: &PgPool, category: Option<&str>) -> sqlx::Result<Vec<NewsArticle>> {
    sqlx::query_as::<_, NewsArticle>(
        "SELECT * FROM news WHERE ($1::text IS NULL OR category = $1) \
         ORDER BY published_at DESC",
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

pub async fn get_news_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<NewsArticle>> {
    sqlx::query_as::<_, NewsArticle>("SELECT * FROM news WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn get_news_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<NewsArticle>> {
    sqlx::query_as::<_, NewsArticle>("SELECT * FROM news WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_news(pool: &PgPool, slug: &str, req: &CreateNewsRequest) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO news (slug, title, excerpt, content, image, category, author, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW())) RETURNING id",
    )
    .bind(slug)
    .bind(&req.title)
    .bind(&req.excerpt)
    .bind(&req.content)
    .bind(&req.image)
    .bind(&req.category)
    .bind(&req.author)
    .bind(req.published_at)
    .fetch_one(pool)
    .await
}

/// Returns `false` if no row matched.
pub async fn update_news(
    pool: &PgPool,
    id: i32,
    slug: Option<&str>,
    req: &UpdateNewsRequest,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"UPDATE news SET
            slug = COALESCE($2, slug),
            title = COALESCE($3, title),
            excerpt = COALESCE($4, excerpt),
            content = COALESCE($5, content),
            image = COALESCE($6, image),
            category = COALESCE($7, category),
            author = COALESCE($8, author),
            published_at = COALESCE($9, published_at),
            updated_at = NOW()
        WHERE id = $1",
    )
    .bind(id)
    .bind(slug)
    .bind(&req.title)
    .bind(&req.excerpt)
    .bind(&req.content)
    .bind(&req.image)
    .bind(&req.category)
    .bind(&req.author)
    .bind(req.published_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_news(pool: &PgPool, id: i32) -> sqlx::Result<Option<NewsArticle>> {
    sqlx::query_as::<_, NewsArticle>("DELETE FROM news WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
