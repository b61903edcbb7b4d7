//! Category operation handlers.

use serde::Deserialize;

use petstore_server::HandlerRegistry;
use petstore_service::CategoryService;
use petstore_store::Database;

use super::DeleteAck;

#[derive(Debug, Deserialize)]
struct NewCategoryInput {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UpdateCategoryInput {
    id: i64,
    name: String,
}

/// Input carrying only a category id, extracted from the path.
#[derive(Debug, Deserialize)]
struct CategoryIdInput {
    #[serde(rename = "categoryId")]
    category_id: i64,
}

pub(crate) fn register(registry: &mut HandlerRegistry, db: &Database) {
    let service = CategoryService::new(db);

    let s = service.clone();
    registry.register("addCategory", move |_ctx, req: NewCategoryInput| {
        let s = s.clone();
        async move { s.create(&req.name).await }
    });

    let s = service.clone();
    registry.register("updateCategory", move |_ctx, req: UpdateCategoryInput| {
        let s = s.clone();
        async move { s.update(req.id, &req.name).await }
    });

    let s = service.clone();
    registry.register("getAllCategories", move |_ctx, _req: serde_json::Value| {
        let s = s.clone();
        async move { s.list().await }
    });

    let s = service.clone();
    registry.register("getCategoryById", move |_ctx, req: CategoryIdInput| {
        let s = s.clone();
        async move { s.get_by_id(req.category_id).await }
    });

    let s = service.clone();
    registry.register("getCategoryWithPets", move |_ctx, req: CategoryIdInput| {
        let s = s.clone();
        async move { s.get_with_pets(req.category_id).await }
    });

    let s = service;
    registry.register("deleteCategory", move |_ctx, req: CategoryIdInput| {
        let s = s.clone();
        async move {
            s.delete(req.category_id).await?;
            Ok(DeleteAck {
                message: format!("Category with id {} deleted", req.category_id),
            })
        }
    });
}
