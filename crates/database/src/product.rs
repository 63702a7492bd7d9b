//! Product persistence.
//!
//! Products are the saved source material for regeneration. There is no
//! standalone CRUD surface; dispatch creates or updates them on request.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Product;

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub image_url: String,
    pub features: String,
    pub concept: String,
    pub target_audience: String,
    pub caption: Option<String>,
}

/// Create a product for a user.
pub async fn create_product(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: &ProductInput,
) -> Result<Product> {
    sqlx::query(
        r#"
        INSERT INTO products (id, user_id, name, image_url, features, concept,
                              target_audience, caption)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.image_url)
    .bind(&input.features)
    .bind(&input.concept)
    .bind(&input.target_audience)
    .bind(&input.caption)
    .execute(pool)
    .await?;

    get_product(pool, id).await
}

/// Update an existing product, enforcing ownership.
pub async fn update_product(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: &ProductInput,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = ?, image_url = ?, features = ?, concept = ?,
            target_audience = ?, caption = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.image_url)
    .bind(&input.features)
    .bind(&input.concept)
    .bind(&input.target_audience)
    .bind(&input.caption)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Product",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Get a product by ID.
pub async fn get_product(pool: &SqlitePool, id: &str) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, user_id, name, image_url, features, concept, target_audience,
               caption, created_at
        FROM products
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Product",
        id: id.to_string(),
    })
}
