use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::professor::{Professor, ProfessorCreateRequest};
use crate::models::review::{Review, ReviewPayload};
use crate::routes::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::professors::list_professors,
        crate::routes::professors::get_professor,
        crate::routes::professors::create_professor,
        crate::routes::professors::delete_professor,
        crate::routes::reviews::upsert_review,
        crate::routes::reviews::delete_review,
    ),
    components(schemas(
        Professor,
        ProfessorCreateRequest,
        Review,
        ReviewPayload,
        HealthResponse
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Professors", description = "Professor directory"),
        (name = "Reviews", description = "Professor reviews")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme so the Swagger UI Authorize dialog can carry
/// externally-issued tokens.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
