//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{categories, equipment, health, upload};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sportstock API",
        version = "0.1.0",
        description = "Sports equipment inventory REST API"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Categories
        categories::list_categories,
        categories::create_category,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::filter_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Upload
        upload::upload_file,
    ),
    components(
        schemas(
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::equipment::Equipment,
            crate::models::equipment::Condition,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentFilterRequest,
            equipment::SuccessResponse,
            upload::UploadForm,
            upload::UploadResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "categories", description = "Equipment categories"),
        (name = "equipment", description = "Equipment inventory"),
        (name = "upload", description = "Image uploads")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
