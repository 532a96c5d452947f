use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::{ValidationResult, Validator};

/// Placeholder image reference used when an item's image is cleared
pub const IMAGE_NOT_AVAILABLE: &str = "/static/img_not_available.png";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_date: String,
    pub category_id: String,
    pub user_id: String,
}

/// Public JSON projection of an item: no image or timestamps
#[derive(Serialize, Debug)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            user_id: item.user_id.clone(),
        }
    }
}

/// Form body for creating a category and for renaming one
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

impl Validator<CategoryForm> for CategoryForm {
    fn validate(&self, data: &CategoryForm) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.name.trim().is_empty() {
            result.add_error("name", "Category name is required");
        }
        if data.name.len() > 250 {
            result.add_error("name", "Category name must be 250 characters or fewer");
        }
        result
    }
}

/// Form body for creating an item
#[derive(Debug, Deserialize)]
pub struct NewItemForm {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Name of the parent category
    pub category: String,
}

impl Validator<NewItemForm> for NewItemForm {
    fn validate(&self, data: &NewItemForm) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.name.trim().is_empty() {
            result.add_error("name", "Item name is required");
        }
        if data.name.len() > 250 {
            result.add_error("name", "Item name must be 250 characters or fewer");
        }
        if data.category.trim().is_empty() {
            result.add_error("category", "Category is required");
        }
        result
    }
}

/// Form body for partial item updates. Empty fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct EditItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Name of the destination category when moving the item
    pub category: Option<String>,
}

/// Form body for the image-editing mutation
#[derive(Debug, Deserialize)]
pub struct ImageForm {
    pub image: Option<String>,
}
