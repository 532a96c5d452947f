//! Ownership-enforced mutations over categories and items.
//!
//! Every mutation runs the same two-phase protocol before touching the
//! store: resolve the target by natural key (NotFound on zero or ambiguous
//! matches), then authorize the requesting user against the target's owner
//! (Unauthorized on mismatch, store untouched). Creation skips the
//! authorize-against-target phase but still requires an authenticated user,
//! and owner ids are never taken from client input.

use tracing::{info, warn};

use super::models::{
    Category, CategoryForm, EditItemForm, Item, NewItemForm, IMAGE_NOT_AVAILABLE,
};
use super::store::CatalogStore;
use super::validators::{non_empty, validate_image_reference};
use crate::common::{ApiError, Validator};

pub struct CatalogService {
    store: CatalogStore,
}

impl CatalogService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    fn authorize(owner_id: &str, user_id: &str, action: &str) -> Result<(), ApiError> {
        if owner_id != user_id {
            warn!(
                owner_id = %owner_id,
                user_id = %user_id,
                action = %action,
                "Ownership check failed"
            );
            return Err(ApiError::Unauthorized(format!(
                "You are not authorized to {}. Please create your own in order to {}.",
                action, action
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Category mutations
    // ========================================================================

    /// Create a category owned by the requesting user
    pub async fn create_category(
        &self,
        user_id: &str,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let validation = form.validate(form);
        if !validation.is_valid {
            return Err(ApiError::from(validation));
        }

        self.store.insert_category(form.name.trim(), user_id).await
    }

    /// Rename a category the requesting user owns
    pub async fn update_category(
        &self,
        user_id: &str,
        category_name: &str,
        form: &CategoryForm,
    ) -> Result<Category, ApiError> {
        let category = self.store.category_by_name(category_name).await?;
        Self::authorize(&category.user_id, user_id, "edit this category")?;

        let validation = form.validate(form);
        if !validation.is_valid {
            return Err(ApiError::from(validation));
        }

        self.store
            .update_category_name(&category.id, form.name.trim())
            .await
    }

    /// Delete a category the requesting user owns; items cascade
    pub async fn delete_category(
        &self,
        user_id: &str,
        category_name: &str,
    ) -> Result<(), ApiError> {
        let category = self.store.category_by_name(category_name).await?;
        Self::authorize(&category.user_id, user_id, "delete this category")?;

        self.store.delete_category(&category.id).await
    }

    // ========================================================================
    // Item mutations
    // ========================================================================

    /// Create an item under an existing category. The item's owner is
    /// copied from the category's owner, never taken from the request.
    pub async fn create_item(&self, user_id: &str, form: &NewItemForm) -> Result<Item, ApiError> {
        let validation = form.validate(form);
        if !validation.is_valid {
            return Err(ApiError::from(validation));
        }

        if let Some(image) = non_empty(form.image.as_deref()) {
            validate_image_reference(image).map_err(ApiError::ValidationError)?;
        }

        let category = self.store.category_by_name(form.category.trim()).await?;

        info!(
            user_id = %user_id,
            category_id = %category.id,
            owner_id = %category.user_id,
            "Creating item"
        );

        self.store
            .insert_item(
                form.name.trim(),
                non_empty(form.description.as_deref()),
                non_empty(form.image.as_deref()),
                &category.id,
                &category.user_id,
            )
            .await
    }

    /// Partial update of an item the requesting user owns. Moving the item
    /// to another category is allowed only when the destination is also
    /// owned by the requester, so item and category owners never diverge.
    pub async fn update_item(
        &self,
        user_id: &str,
        category_name: &str,
        item_name: &str,
        form: &EditItemForm,
    ) -> Result<Item, ApiError> {
        let item = self.resolve_item(category_name, item_name).await?;
        Self::authorize(&item.user_id, user_id, "edit this item")?;

        let destination_id = match non_empty(form.category.as_deref()) {
            Some(destination_name) => {
                let destination = self.store.category_by_name(destination_name).await?;
                Self::authorize(&destination.user_id, user_id, "move items into this category")?;
                Some(destination.id)
            }
            None => None,
        };

        self.store
            .update_item(
                &item.id,
                non_empty(form.name.as_deref()),
                non_empty(form.description.as_deref()),
                None,
                destination_id.as_deref(),
            )
            .await
    }

    /// Delete an item the requesting user owns
    pub async fn delete_item(
        &self,
        user_id: &str,
        category_name: &str,
        item_name: &str,
    ) -> Result<(), ApiError> {
        let item = self.resolve_item(category_name, item_name).await?;
        Self::authorize(&item.user_id, user_id, "delete this item")?;

        self.store.delete_item(&item.id).await
    }

    /// Replace the image of an item the requesting user owns
    pub async fn update_item_image(
        &self,
        user_id: &str,
        category_name: &str,
        item_name: &str,
        image: &str,
    ) -> Result<Item, ApiError> {
        let item = self.resolve_item(category_name, item_name).await?;
        Self::authorize(&item.user_id, user_id, "edit this item")?;

        validate_image_reference(image).map_err(ApiError::ValidationError)?;

        self.store
            .update_item(&item.id, None, None, Some(image), None)
            .await
    }

    /// Clear the image of an item the requesting user owns by pointing it
    /// at the "unavailable" placeholder
    pub async fn delete_item_image(
        &self,
        user_id: &str,
        category_name: &str,
        item_name: &str,
    ) -> Result<Item, ApiError> {
        let item = self.resolve_item(category_name, item_name).await?;
        Self::authorize(&item.user_id, user_id, "delete this item")?;

        self.store
            .update_item(&item.id, None, None, Some(IMAGE_NOT_AVAILABLE), None)
            .await
    }

    async fn resolve_item(&self, category_name: &str, item_name: &str) -> Result<Item, ApiError> {
        let category = self.store.category_by_name(category_name).await?;
        self.store.item_by_name(item_name, &category.id).await
    }
}
