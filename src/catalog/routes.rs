use super::handlers;
use axum::{routing::get, Router};

/// Creates the catalog router with all read, JSON, and mutation routes
pub fn catalog_routes() -> Router {
    Router::new()
        // Static pages
        .route("/", get(handlers::show_cover))
        .route("/contact", get(handlers::show_contact))
        .route("/about", get(handlers::show_about))
        // Read views
        .route("/catalog", get(handlers::show_home))
        .route("/catalog/:category/items", get(handlers::show_category_items))
        .route("/catalog/:category/:item", get(handlers::show_item))
        // JSON projections
        .route("/catalog.json", get(handlers::catalog_json))
        .route("/categories.json", get(handlers::categories_json))
        .route("/:category/items.json", get(handlers::items_json))
        .route(
            "/category/:category/item/:item/JSON",
            get(handlers::item_json),
        )
        // Category mutations
        .route(
            "/catalog/newcategory",
            get(handlers::new_category_form).post(handlers::create_category),
        )
        .route(
            "/catalog/:category/edit",
            get(handlers::edit_category_form).post(handlers::update_category),
        )
        .route(
            "/catalog/:category/delete",
            get(handlers::delete_category_form).post(handlers::delete_category),
        )
        // Item mutations
        .route(
            "/catalog/newitem",
            get(handlers::new_item_form).post(handlers::create_item),
        )
        .route(
            "/catalog/:category/:item/edit",
            get(handlers::edit_item_form).post(handlers::update_item),
        )
        .route(
            "/catalog/:category/:item/delete",
            get(handlers::delete_item_form).post(handlers::delete_item),
        )
        .route(
            "/catalog/:category/:item/editimage",
            get(handlers::edit_image_form).post(handlers::update_image),
        )
        .route(
            "/catalog/:category/:item/deleteimage",
            get(handlers::delete_image_form).post(handlers::delete_image),
        )
}
