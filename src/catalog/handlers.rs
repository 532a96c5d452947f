//! Catalog view and API handlers.
//!
//! Reads are public (with owner-aware variants when the viewer owns the
//! record); mutations require a logged-in session and run through
//! CatalogService's resolve → authorize → apply protocol.

use axum::{
    extract::{Extension, Path},
    response::{Html, Redirect},
    Form, Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{
    Category, CategoryForm, EditItemForm, ImageForm, Item, ItemSummary, NewItemForm,
};
use super::service::CatalogService;
use super::store::CatalogStore;
use crate::auth::{MaybeSessionUser, SessionUser};
use crate::common::{ApiError, AppState};

fn service(state: &AppState) -> CatalogService {
    CatalogService::new(CatalogStore::new(state.db.clone()))
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

// ============================================================================
// Static pages
// ============================================================================

pub async fn show_cover() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Catalog</title></head>
<body>
    <h1>Catalog</h1>
    <p><a href="/catalog">Browse the catalog</a></p>
    <p><a href="/login">Sign in</a></p>
</body>
</html>
"#,
    )
}

pub async fn show_contact() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Contact</title></head>
<body>
    <h1>Contact</h1>
    <p><a href="/catalog">Back to catalog</a></p>
</body>
</html>
"#,
    )
}

pub async fn show_about() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>About</title></head>
<body>
    <h1>About</h1>
    <p>A small catalog of categories and the items they contain.</p>
    <p><a href="/catalog">Back to catalog</a></p>
</body>
</html>
"#,
    )
}

// ============================================================================
// Read views
// ============================================================================

fn category_list_html(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| {
            format!(
                r#"<li><a href="/catalog/{}/items">{}</a></li>"#,
                encode(&c.name),
                c.name
            )
        })
        .collect()
}

fn item_link_html(item: &Item, category_name: &str) -> String {
    format!(
        r#"<li><a href="/catalog/{}/{}">{}</a></li>"#,
        encode(category_name),
        encode(&item.name),
        item.name
    )
}

/// GET /catalog - home page: categories by name, latest items first
pub async fn show_home(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeSessionUser(viewer): MaybeSessionUser,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let categories = store.list_categories().await?;
    let items = store.list_items().await?;

    let mut latest = String::new();
    for item in &items {
        let category = store.category_by_id(&item.category_id).await?;
        latest.push_str(&item_link_html(item, &category.name));
    }

    let toolbar = match &viewer {
        Some(user) => format!(
            r#"<p>Logged in as {}.
 <a href="/catalog/newcategory">New category</a> |
 <a href="/catalog/newitem">New item</a> |
 <a href="/disconnect">Logout</a></p>"#,
            user.name
        ),
        None => r#"<p><a href="/login">Sign in</a> to add your own categories and items.</p>"#
            .to_string(),
    };

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Catalog</title></head>
<body>
    <h1>Catalog</h1>
    {toolbar}
    <h2>Categories</h2>
    <ul>{categories}</ul>
    <h2>Latest Items</h2>
    <ul>{latest}</ul>
</body>
</html>
"#,
        toolbar = toolbar,
        categories = category_list_html(&categories),
        latest = latest,
    )))
}

/// GET /catalog/:category/items - items of one category, owner-aware
pub async fn show_category_items(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeSessionUser(viewer): MaybeSessionUser,
    Path(category_name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let categories = store.list_categories().await?;
    let category = store.category_by_name(&category_name).await?;
    let items = store.list_items_in_category(&category.id).await?;

    let is_owner = viewer
        .as_ref()
        .map(|u| u.id == category.user_id)
        .unwrap_or(false);

    let owner_tools = if is_owner {
        format!(
            r#"<p><a href="/catalog/{cat}/edit">Edit</a> |
 <a href="/catalog/{cat}/delete">Delete</a> |
 <a href="/catalog/newitem">New item</a></p>"#,
            cat = encode(&category.name)
        )
    } else {
        String::new()
    };

    let item_list: String = items
        .iter()
        .map(|item| item_link_html(item, &category.name))
        .collect();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name}</title></head>
<body>
    <h1>{name}</h1>
    {owner_tools}
    <h2>Items ({count})</h2>
    <ul>{item_list}</ul>
    <h2>All Categories</h2>
    <ul>{categories}</ul>
</body>
</html>
"#,
        name = category.name,
        owner_tools = owner_tools,
        count = items.len(),
        item_list = item_list,
        categories = category_list_html(&categories),
    )))
}

/// GET /catalog/:category/:item - item detail, owner-aware
pub async fn show_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeSessionUser(viewer): MaybeSessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;

    let is_owner = viewer
        .as_ref()
        .map(|u| u.id == item.user_id)
        .unwrap_or(false);

    let owner_tools = if is_owner {
        format!(
            r#"<p><a href="/catalog/{cat}/{item}/edit">Edit</a> |
 <a href="/catalog/{cat}/{item}/delete">Delete</a> |
 <a href="/catalog/{cat}/{item}/editimage">Edit image</a> |
 <a href="/catalog/{cat}/{item}/deleteimage">Delete image</a></p>"#,
            cat = encode(&category.name),
            item = encode(&item.name),
        )
    } else {
        String::new()
    };

    let image = item
        .image
        .as_deref()
        .map(|url| format!(r#"<img src="{}" alt="{}">"#, url, item.name))
        .unwrap_or_default();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name}</title></head>
<body>
    <h1>{name}</h1>
    {image}
    <p>{description}</p>
    {owner_tools}
    <p><a href="/catalog/{cat}/items">Back to {category}</a></p>
</body>
</html>
"#,
        name = item.name,
        image = image,
        description = item.description.as_deref().unwrap_or(""),
        owner_tools = owner_tools,
        cat = encode(&category.name),
        category = category.name,
    )))
}

// ============================================================================
// JSON endpoints
// ============================================================================

/// GET /catalog.json - all categories and items
pub async fn catalog_json(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let categories = store.list_categories().await?;
    let items = store.list_items().await?;
    let summaries: Vec<ItemSummary> = items.iter().map(ItemSummary::from).collect();

    Ok(Json(serde_json::json!({
        "Categories": categories,
        "Items": summaries,
    })))
}

/// GET /categories.json - all categories
pub async fn categories_json(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let categories = store.list_categories().await?;

    Ok(Json(serde_json::json!({ "Categories": categories })))
}

/// GET /:category/items.json - items of one category
pub async fn items_json(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(category_name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let items = store.list_items_in_category(&category.id).await?;
    let summaries: Vec<ItemSummary> = items.iter().map(ItemSummary::from).collect();

    Ok(Json(serde_json::json!({ "Items": summaries })))
}

/// GET /category/:category/item/:item/JSON - a single item
pub async fn item_json(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;

    Ok(Json(serde_json::json!({ "item": ItemSummary::from(&item) })))
}

// ============================================================================
// Category mutations
// ============================================================================

fn form_page(title: &str, action: &str, fields: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body>
    <h1>{title}</h1>
    <form method="post" action="{action}">
        {fields}
        <button type="submit">Submit</button>
    </form>
</body>
</html>
"#,
        title = title,
        action = action,
        fields = fields,
    ))
}

/// GET /catalog/newcategory
pub async fn new_category_form(_user: SessionUser) -> Html<String> {
    form_page(
        "New Category",
        "/catalog/newcategory",
        r#"<input type="text" name="name" placeholder="Category name" required>"#,
    )
}

/// POST /catalog/newcategory
pub async fn create_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    service(&state).create_category(&user.id, &form).await?;

    Ok(Redirect::to("/catalog"))
}

/// GET /catalog/:category/edit
pub async fn edit_category_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path(category_name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let category = CatalogStore::new(state.db.clone())
        .category_by_name(&category_name)
        .await?;

    Ok(form_page(
        "Edit Category",
        &format!("/catalog/{}/edit", encode(&category.name)),
        &format!(
            r#"<input type="text" name="name" value="{}" required>"#,
            category.name
        ),
    ))
}

/// POST /catalog/:category/edit
pub async fn update_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path(category_name): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    service(&state)
        .update_category(&user.id, &category_name, &form)
        .await?;

    Ok(Redirect::to("/catalog"))
}

/// GET /catalog/:category/delete
pub async fn delete_category_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path(category_name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let category = CatalogStore::new(state.db.clone())
        .category_by_name(&category_name)
        .await?;

    Ok(form_page(
        "Delete Category",
        &format!("/catalog/{}/delete", encode(&category.name)),
        &format!(
            "<p>Delete category {} and all of its items?</p>",
            category.name
        ),
    ))
}

/// POST /catalog/:category/delete - cascades to the category's items
pub async fn delete_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path(category_name): Path<String>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    service(&state)
        .delete_category(&user.id, &category_name)
        .await?;

    Ok(Redirect::to("/catalog"))
}

// ============================================================================
// Item mutations
// ============================================================================

/// GET /catalog/newitem
pub async fn new_item_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let categories = CatalogStore::new(state.db.clone()).list_categories().await?;

    let options: String = categories
        .iter()
        .map(|c| format!(r#"<option value="{0}">{0}</option>"#, c.name))
        .collect();

    Ok(form_page(
        "New Item",
        "/catalog/newitem",
        &format!(
            r#"<input type="text" name="name" placeholder="Item name" required>
        <textarea name="description" placeholder="Description"></textarea>
        <input type="text" name="image" placeholder="Image URL">
        <select name="category">{}</select>"#,
            options
        ),
    ))
}

/// POST /catalog/newitem
pub async fn create_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Form(form): Form<NewItemForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    service(&state).create_item(&user.id, &form).await?;

    Ok(Redirect::to("/catalog"))
}

/// GET /catalog/:category/:item/edit
pub async fn edit_item_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;
    let categories = store.list_categories().await?;

    let options: String = categories
        .iter()
        .map(|c| {
            let selected = if c.id == item.category_id {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{0}"{1}>{0}</option>"#, c.name, selected)
        })
        .collect();

    Ok(form_page(
        "Edit Item",
        &format!(
            "/catalog/{}/{}/edit",
            encode(&category.name),
            encode(&item.name)
        ),
        &format!(
            r#"<input type="text" name="name" value="{}">
        <textarea name="description">{}</textarea>
        <select name="category">{}</select>"#,
            item.name,
            item.description.as_deref().unwrap_or(""),
            options
        ),
    ))
}

/// POST /catalog/:category/:item/edit - partial update
pub async fn update_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
    Form(form): Form<EditItemForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    let catalog = service(&state);

    let item = catalog
        .update_item(&user.id, &category_name, &item_name, &form)
        .await?;
    let category = catalog.store().category_by_id(&item.category_id).await?;

    Ok(Redirect::to(&format!(
        "/catalog/{}/{}",
        encode(&category.name),
        encode(&item.name)
    )))
}

/// GET /catalog/:category/:item/delete
pub async fn delete_item_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;

    Ok(form_page(
        "Delete Item",
        &format!(
            "/catalog/{}/{}/delete",
            encode(&category.name),
            encode(&item.name)
        ),
        &format!("<p>Delete item {}?</p>", item.name),
    ))
}

/// POST /catalog/:category/:item/delete
pub async fn delete_item(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();
    service(&state)
        .delete_item(&user.id, &category_name, &item_name)
        .await?;

    Ok(Redirect::to(&format!(
        "/catalog/{}/items",
        encode(&category_name)
    )))
}

/// GET /catalog/:category/:item/editimage
pub async fn edit_image_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;

    Ok(form_page(
        "Edit Image",
        &format!(
            "/catalog/{}/{}/editimage",
            encode(&category.name),
            encode(&item.name)
        ),
        &format!(
            r#"<input type="text" name="image" value="{}" placeholder="Image URL">"#,
            item.image.as_deref().unwrap_or("")
        ),
    ))
}

/// POST /catalog/:category/:item/editimage
pub async fn update_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
    Form(form): Form<ImageForm>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let image = form
        .image
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::ValidationError("image: Image URL is required".to_string()))?;

    let item = service(&state)
        .update_item_image(&user.id, &category_name, &item_name, image)
        .await?;

    Ok(Redirect::to(&format!(
        "/catalog/{}/{}",
        encode(&category_name),
        encode(&item.name)
    )))
}

/// GET /catalog/:category/:item/deleteimage
pub async fn delete_image_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let state = state_lock.read().await.clone();
    let store = CatalogStore::new(state.db.clone());

    let category = store.category_by_name(&category_name).await?;
    let item = store.item_by_name(&item_name, &category.id).await?;

    Ok(form_page(
        "Delete Image",
        &format!(
            "/catalog/{}/{}/deleteimage",
            encode(&category.name),
            encode(&item.name)
        ),
        &format!("<p>Remove the image from {}?</p>", item.name),
    ))
}

/// POST /catalog/:category/:item/deleteimage - sets the placeholder image
pub async fn delete_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: SessionUser,
    Path((category_name, item_name)): Path<(String, String)>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let item = service(&state)
        .delete_item_image(&user.id, &category_name, &item_name)
        .await?;

    Ok(Redirect::to(&format!(
        "/catalog/{}/{}",
        encode(&category_name),
        encode(&item.name)
    )))
}
