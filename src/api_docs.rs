use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        // Add other endpoints here as we document them
    ),
    components(
        schemas(
            // We will need to derive ToSchema for our models
        )
    ),
    tags(
        (name = "selfstorage", description = "Self-storage rental API")
    )
)]
pub struct ApiDoc;
