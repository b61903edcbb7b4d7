//! Pet operation handlers.

use serde::Deserialize;

use petstore_server::HandlerRegistry;
use petstore_service::{CategoryPatch, NewPet, PetService, UpdatePet};
use petstore_store::Database;

use super::DeleteAck;

/// Input carrying only a pet id, extracted from the path.
#[derive(Debug, Deserialize)]
struct PetIdInput {
    #[serde(rename = "petId")]
    pet_id: i64,
}

/// Input for `findPetsByStatus`. The contract supplies the default, so
/// `status` is only absent when the operation is invoked out of band.
#[derive(Debug, Deserialize)]
struct FindByStatusInput {
    #[serde(default)]
    status: Option<String>,
}

/// Input for `updatePetWithForm`: path id plus optional query fields.
#[derive(Debug, Deserialize)]
struct PetFormInput {
    #[serde(rename = "petId")]
    pet_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub(crate) fn register(registry: &mut HandlerRegistry, db: &Database) {
    let service = PetService::new(db);

    let s = service.clone();
    registry.register("addPet", move |_ctx, req: NewPet| {
        let s = s.clone();
        async move { s.create(req).await }
    });

    let s = service.clone();
    registry.register("updatePet", move |_ctx, req: UpdatePet| {
        let s = s.clone();
        async move { s.update(req).await }
    });

    let s = service.clone();
    registry.register("findPetsByStatus", move |_ctx, req: FindByStatusInput| {
        let s = s.clone();
        async move { s.find_by_status(req.status.as_deref()).await }
    });

    let s = service.clone();
    registry.register("listAllPets", move |_ctx, _req: serde_json::Value| {
        let s = s.clone();
        async move { s.list_all().await }
    });

    let s = service.clone();
    registry.register("getPetById", move |_ctx, req: PetIdInput| {
        let s = s.clone();
        async move { s.get_by_id(req.pet_id).await }
    });

    let s = service.clone();
    registry.register("updatePetWithForm", move |_ctx, req: PetFormInput| {
        let s = s.clone();
        async move {
            s.update(UpdatePet {
                id: req.pet_id,
                name: req.name,
                status: req.status,
                category: CategoryPatch::Unchanged,
            })
            .await
        }
    });

    let s = service;
    registry.register("deletePet", move |_ctx, req: PetIdInput| {
        let s = s.clone();
        async move {
            s.delete(req.pet_id).await?;
            Ok(DeleteAck {
                message: format!("Pet with id {} deleted", req.pet_id),
            })
        }
    });
}
