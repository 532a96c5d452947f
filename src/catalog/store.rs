//! Typed entity access for categories and items.
//!
//! Natural-key lookups report zero and ambiguous matches as NotFound;
//! the store never returns an arbitrary row for a non-unique name.

use sqlx::SqlitePool;
use tracing::info;

use super::models::{Category, Item};
use crate::common::{generate_category_id, generate_item_id, ApiError};

pub struct CatalogStore {
    db: SqlitePool,
}

impl CatalogStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Category access
    // ========================================================================

    /// All categories ordered by name
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn category_by_id(&self, category_id: &str) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>("SELECT id, name, user_id FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    /// Natural-key lookup. NotFound on zero or more-than-one match.
    pub async fn category_by_name(&self, name: &str) -> Result<Category, ApiError> {
        let mut rows =
            sqlx::query_as::<_, Category>("SELECT id, name, user_id FROM categories WHERE name = ?")
                .bind(name)
                .fetch_all(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        match rows.pop() {
            Some(category) if rows.is_empty() => Ok(category),
            _ => Err(ApiError::NotFound("Category not found".to_string())),
        }
    }

    pub async fn insert_category(&self, name: &str, user_id: &str) -> Result<Category, ApiError> {
        let category_id = generate_category_id();

        sqlx::query("INSERT INTO categories (id, name, user_id) VALUES (?, ?, ?)")
            .bind(&category_id)
            .bind(name)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!("Created category: {} ({})", name, category_id);

        self.category_by_id(&category_id).await
    }

    pub async fn update_category_name(
        &self,
        category_id: &str,
        name: &str,
    ) -> Result<Category, ApiError> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(category_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!("Updated category: {}", category_id);

        self.category_by_id(category_id).await
    }

    /// Delete a category; the foreign key cascade removes its items
    pub async fn delete_category(&self, category_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }

        info!("Deleted category: {}", category_id);

        Ok(())
    }

    // ========================================================================
    // Item access
    // ========================================================================

    /// All items, newest first
    pub async fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, image, created_date, category_id, user_id
            FROM items
            ORDER BY created_date DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    /// Items of a single category ordered by name
    pub async fn list_items_in_category(&self, category_id: &str) -> Result<Vec<Item>, ApiError> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, image, created_date, category_id, user_id
            FROM items
            WHERE category_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn item_by_id(&self, item_id: &str) -> Result<Item, ApiError> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, image, created_date, category_id, user_id
            FROM items
            WHERE id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))
    }

    /// Natural-key lookup scoped by parent category.
    /// NotFound on zero or more-than-one match.
    pub async fn item_by_name(&self, name: &str, category_id: &str) -> Result<Item, ApiError> {
        let mut rows = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, image, created_date, category_id, user_id
            FROM items
            WHERE name = ? AND category_id = ?
            "#,
        )
        .bind(name)
        .bind(category_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        match rows.pop() {
            Some(item) if rows.is_empty() => Ok(item),
            _ => Err(ApiError::NotFound("Item not found".to_string())),
        }
    }

    pub async fn insert_item(
        &self,
        name: &str,
        description: Option<&str>,
        image: Option<&str>,
        category_id: &str,
        user_id: &str,
    ) -> Result<Item, ApiError> {
        let item_id = generate_item_id();
        let created_date = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO items (id, name, description, image, created_date, category_id, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item_id)
        .bind(name)
        .bind(description)
        .bind(image)
        .bind(&created_date)
        .bind(category_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!("Created item: {} ({})", name, item_id);

        self.item_by_id(&item_id).await
    }

    /// Partial update: only supplied fields are overwritten.
    /// `created_date` and `user_id` are never touched here.
    pub async fn update_item(
        &self,
        item_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        image: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Item, ApiError> {
        let mut updates = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(name) = name {
            updates.push("name = ?");
            params.push(name.to_string());
        }

        if let Some(description) = description {
            updates.push("description = ?");
            params.push(description.to_string());
        }

        if let Some(image) = image {
            updates.push("image = ?");
            params.push(image.to_string());
        }

        if let Some(category_id) = category_id {
            updates.push("category_id = ?");
            params.push(category_id.to_string());
        }

        if updates.is_empty() {
            return self.item_by_id(item_id).await;
        }

        params.push(item_id.to_string());

        let query = format!("UPDATE items SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&query);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        query_builder
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!("Updated item: {}", item_id);

        self.item_by_id(item_id).await
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Item not found".to_string()));
        }

        info!("Deleted item: {}", item_id);

        Ok(())
    }
}
