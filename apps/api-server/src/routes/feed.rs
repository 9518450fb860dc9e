use crate::{error::ApiError, Ctx};
use axum::{
    extract::{Multipart, State},
    Json,
};
use caption_feed::FeedItem;
use image::DynamicImage;

const IMAGE_FIELD: &str = "image";

pub async fn list(State(ctx): State<Ctx>) -> Result<Json<Vec<FeedItem>>, ApiError> {
    Ok(Json(ctx.pipeline.feed().await?))
}

/// Multipart upload with an `image` field. A missing or empty field leaves
/// the feed unchanged.
pub async fn submit(
    State(ctx): State<Ctx>,
    mut multipart: Multipart,
) -> Result<Json<Vec<FeedItem>>, ApiError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let data = field.bytes().await?;
        if data.is_empty() {
            continue;
        }
        image = Some(decode_image(data.to_vec()).await?);
    }

    let feed = ctx.pipeline.submit(image).await?;
    Ok(Json(feed))
}

async fn decode_image(data: Vec<u8>) -> Result<DynamicImage, ApiError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&data))
        .await
        .map_err(|e| ApiError::Internal(format!("image decoding task failed: {}", e)))?
        .map_err(|e| ApiError::BadRequest(format!("unsupported image: {}", e)))
}
