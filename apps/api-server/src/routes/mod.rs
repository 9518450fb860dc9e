mod feed;
mod page;

use crate::Ctx;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

pub fn get_routes(ctx: Ctx) -> Router {
    let images_route = format!("/{}", ctx.pipeline.image_store().dir());
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", get(page::index))
        .route("/api/feed", get(feed::list).post(feed::submit))
        .nest_service(&images_route, ServeDir::new(ctx.image_dir()))
        .layer(DefaultBodyLimit::max(ctx.max_upload_bytes))
        .layer(cors)
        .with_state(ctx)
}
