//! Tests for catalog module
//!
//! These tests verify the ownership-enforcement protocol against a real
//! (in-memory) store: owner inheritance, cascade deletes, partial updates,
//! and natural-key ambiguity handling.

#[cfg(test)]
mod tests {
    use super::super::models::{CategoryForm, EditItemForm, NewItemForm, IMAGE_NOT_AVAILABLE};
    use super::super::service::CatalogService;
    use super::super::store::CatalogStore;
    use crate::auth::models::User;
    use crate::auth::session::SessionService;
    use crate::common::migrations::run_migrations;
    use crate::common::ApiError;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("connect options")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("pool");
        run_migrations(&pool).await.expect("migrations");
        pool
    }

    async fn seed_user(pool: &SqlitePool, name: &str, email: &str) -> User {
        SessionService::new(pool.clone())
            .create_user(name, email, None)
            .await
            .expect("seed user")
    }

    fn new_item_form(name: &str, category: &str) -> NewItemForm {
        NewItemForm {
            name: name.to_string(),
            description: Some("a description".to_string()),
            image: Some("https://example.com/pic.png".to_string()),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_item_inherits_category_owner() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        let category = service
            .create_category(
                &owner.id,
                &CategoryForm {
                    name: "Soccer".to_string(),
                },
            )
            .await
            .expect("category");

        let item = service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        assert_eq!(item.user_id, category.user_id);
        assert_eq!(item.category_id, category.id);
    }

    #[tokio::test]
    async fn test_category_delete_cascades_to_items() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("soccer");
        service
            .create_category(&owner.id, &CategoryForm { name: "Basketball".to_string() })
            .await
            .expect("basketball");

        service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("shin guards");
        service
            .create_item(&owner.id, &new_item_form("Cleats", "Soccer"))
            .await
            .expect("cleats");
        service
            .create_item(&owner.id, &new_item_form("Hoop", "Basketball"))
            .await
            .expect("hoop");

        service
            .delete_category(&owner.id, "Soccer")
            .await
            .expect("delete");

        let store = CatalogStore::new(pool.clone());
        let remaining = store.list_items().await.expect("items");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Hoop");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_delete_item() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let intruder = seed_user(&pool, "Mallory", "mallory@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        let category = service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");
        service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        let result = service
            .delete_item(&intruder.id, "Soccer", "Two Shin Guards")
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        // The item must survive the rejected mutation
        let store = CatalogStore::new(pool.clone());
        let survivor = store
            .item_by_name("Two Shin Guards", &category.id)
            .await
            .expect("item still present");
        assert_eq!(survivor.user_id, owner.id);
    }

    #[tokio::test]
    async fn test_non_owner_edit_leaves_category_unchanged() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let intruder = seed_user(&pool, "Mallory", "mallory@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");

        let result = service
            .update_category(
                &intruder.id,
                "Soccer",
                &CategoryForm {
                    name: "Stolen".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        let store = CatalogStore::new(pool.clone());
        assert!(store.category_by_name("Soccer").await.is_ok());
        assert!(matches!(
            store.category_by_name("Stolen").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update_preserves_unsupplied_fields() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");
        let original = service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        // Only the name is supplied; the form's other fields arrive empty
        let updated = service
            .update_item(
                &owner.id,
                "Soccer",
                "Two Shin Guards",
                &EditItemForm {
                    name: Some("Shin Guards".to_string()),
                    description: Some(String::new()),
                    category: Some(String::new()),
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.name, "Shin Guards");
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.image, original.image);
        assert_eq!(updated.category_id, original.category_id);
        assert_eq!(updated.created_date, original.created_date);
        assert_eq!(updated.user_id, original.user_id);
    }

    #[tokio::test]
    async fn test_ambiguous_name_lookup_is_not_found() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let store = CatalogStore::new(pool.clone());

        // Names are not globally unique; two categories can share one
        store.insert_category("Tools", &owner.id).await.expect("first");
        store.insert_category("Tools", &owner.id).await.expect("second");

        assert!(matches!(
            store.category_by_name("Tools").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            store.category_by_name("Missing").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_moving_item_requires_owning_destination() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let other = seed_user(&pool, "Bob", "bob@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("soccer");
        service
            .create_category(&other.id, &CategoryForm { name: "Chess".to_string() })
            .await
            .expect("chess");
        service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        // Destination belongs to someone else: item and category owners
        // would diverge, so the move is rejected
        let result = service
            .update_item(
                &owner.id,
                "Soccer",
                "Two Shin Guards",
                &EditItemForm {
                    category: Some("Chess".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        // A destination owned by the requester is fine
        let futsal = service
            .create_category(&owner.id, &CategoryForm { name: "Futsal".to_string() })
            .await
            .expect("futsal");
        let moved = service
            .update_item(
                &owner.id,
                "Soccer",
                "Two Shin Guards",
                &EditItemForm {
                    category: Some("Futsal".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("move");

        assert_eq!(moved.category_id, futsal.id);
        assert_eq!(moved.user_id, futsal.user_id);
    }

    #[tokio::test]
    async fn test_delete_image_sets_placeholder() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");
        service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        let cleared = service
            .delete_item_image(&owner.id, "Soccer", "Two Shin Guards")
            .await
            .expect("clear image");

        assert_eq!(cleared.image.as_deref(), Some(IMAGE_NOT_AVAILABLE));
    }

    #[tokio::test]
    async fn test_image_mutations_are_ownership_checked() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let intruder = seed_user(&pool, "Mallory", "mallory@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");
        let original = service
            .create_item(&owner.id, &new_item_form("Two Shin Guards", "Soccer"))
            .await
            .expect("item");

        let result = service
            .update_item_image(
                &intruder.id,
                "Soccer",
                "Two Shin Guards",
                "https://evil.example.com/x.png",
            )
            .await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));

        let store = CatalogStore::new(pool.clone());
        let unchanged = store.item_by_id(&original.id).await.expect("item");
        assert_eq!(unchanged.image, original.image);
    }

    #[tokio::test]
    async fn test_categories_listing_matches_insertions() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        let soccer = service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("soccer");
        let basketball = service
            .create_category(&owner.id, &CategoryForm { name: "Basketball".to_string() })
            .await
            .expect("basketball");

        let listed = CatalogStore::new(pool.clone())
            .list_categories()
            .await
            .expect("list");

        assert_eq!(listed.len(), 2);
        for expected in [&soccer, &basketball] {
            let found = listed
                .iter()
                .find(|c| c.id == expected.id)
                .expect("inserted category listed");
            assert_eq!(found.name, expected.name);
            assert_eq!(found.user_id, owner.id);
        }
    }

    #[tokio::test]
    async fn test_empty_category_name_rejected() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        let result = service
            .create_category(&owner.id, &CategoryForm { name: "   ".to_string() })
            .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_empty_item_name_rejected() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "Alice", "alice@example.com").await;
        let service = CatalogService::new(CatalogStore::new(pool.clone()));

        service
            .create_category(&owner.id, &CategoryForm { name: "Soccer".to_string() })
            .await
            .expect("category");

        let mut form = new_item_form("", "Soccer");
        form.name = String::new();
        let result = service.create_item(&owner.id, &form).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }
}
