use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::{require_admin, require_authenticated, require_examiner};
use crate::modules::auth::router::init_auth_router;
use crate::modules::cars::router::init_cars_router;
use crate::modules::classrooms::router::init_classrooms_router;
use crate::modules::exams::router::{
    init_exam_lookup_router, init_exams_router, init_my_exams_router,
};
use crate::modules::groups::router::init_groups_router;
use crate::modules::instructors::router::init_instructors_router;
use crate::modules::lessons::router::init_lessons_router;
use crate::modules::reference::router::init_reference_router;
use crate::modules::reports::router::init_reports_router;
use crate::modules::students::router::init_students_router;
use crate::modules::teachers::router::init_teachers_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/students",
                    init_students_router()
                        .merge(init_reports_router())
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/teachers",
                    init_teachers_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/instructors",
                    init_instructors_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/groups",
                    init_groups_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/lessons",
                    init_lessons_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/cars",
                    init_cars_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/classrooms",
                    init_classrooms_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/exams",
                    init_exams_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .merge(
                    init_exam_lookup_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest(
                    "/examiner",
                    init_my_exams_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_examiner,
                    )),
                )
                .merge(init_reference_router().route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_authenticated,
                ))),
        )
        .with_state(state)
        .layer({
            let allowed_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string())
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
