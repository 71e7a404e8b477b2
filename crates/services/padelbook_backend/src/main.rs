// File: services/padelbook_backend/src/main.rs
use axum::{routing::get, Router};
use padelbook_booking::handlers::BookingState;
use padelbook_booking::routes as booking_routes;
use padelbook_common::logging;
use padelbook_config::{ensure_dotenv_loaded, load_config};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod stores;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    ensure_dotenv_loaded();
    logging::init();
    let config = Arc::new(logging::log_result(
        load_config(),
        "Configuration loaded",
        "Failed to load config",
    )?);

    let stores = stores::build_stores(&config).await?;
    let booking_state = BookingState::new(config.clone(), stores.bookings, stores.profiles)?;
    let booking_router = booking_routes::routes(Arc::new(booking_state));

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Padelbook API!" }))
        .merge(booking_router);

    #[allow(unused_mut)] // mutated when the openapi feature is on
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use padelbook_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Padelbook API",
                version = "0.1.0",
                description = "Padel court pre-booking API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
