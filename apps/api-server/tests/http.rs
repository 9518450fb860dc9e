use api_server::{routes::get_routes, Config, Ctx};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use caption_feed::CaptionProvider;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tower::ServiceExt;

const BOUNDARY: &str = "feed-test-boundary";

/// Numbers its captions: "caption 1", "caption 2", ...
struct CountingCaptions(AtomicUsize);

#[async_trait]
impl CaptionProvider for CountingCaptions {
    async fn caption(&self, _image: &RgbImage) -> anyhow::Result<String> {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("caption {}", n))
    }
}

struct TestServer {
    data_dir: PathBuf,
    app: Router,
}

impl TestServer {
    async fn new() -> Self {
        Self::with_env(&[]).await
    }

    async fn with_env(vars: &[(&str, &str)]) -> Self {
        let data_dir = std::env::temp_dir().join(format!("api-server-{}", uuid::Uuid::new_v4()));
        let config = Config::from_lookup(|key| match key {
            "LOCAL_DATA_DIR" => Some(data_dir.to_string_lossy().to_string()),
            _ => vars
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string()),
        })
        .unwrap();
        let ctx = Ctx::new(&config, Arc::new(CountingCaptions(AtomicUsize::new(0))))
            .await
            .unwrap();
        Self {
            app: get_routes(ctx),
            data_dir,
        }
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self
            .send(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_multipart(&self, parts: &[(&str, &[u8])]) -> (StatusCode, serde_json::Value) {
        let mut body = Vec::new();
        for (name, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/feed")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(image::GrayImage::from_fn(width, height, |x, _| {
        image::Luma([(x * 20) as u8])
    }));
    let mut data = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

#[test_log::test(tokio::test)]
async fn test_empty_feed() {
    let server = TestServer::new().await;
    let (status, feed) = server.get_json("/api/feed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed, serde_json::json!([]));
}

#[test_log::test(tokio::test)]
async fn test_submit_prepends_to_feed() {
    let server = TestServer::new().await;
    let png = png_bytes(8, 8);

    let (status, feed) = server.post_multipart(&[("image", png.as_slice())]).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap().clone();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0][1], "caption 1");
    let first_path = feed[0][0].as_str().unwrap().to_string();
    assert!(first_path.starts_with("saved_images/"));
    assert!(first_path.ends_with(".jpg"));

    let (_, feed) = server.post_multipart(&[("image", png.as_slice())]).await;
    let captions: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[1].as_str().unwrap())
        .collect();
    assert_eq!(captions, vec!["caption 2", "caption 1"]);
    assert_eq!(feed[1][0], first_path.as_str());

    let (_, listed) = server.get_json("/api/feed").await;
    assert_eq!(listed, feed);

    let ledger: serde_json::Value =
        serde_json::from_slice(&std::fs::read(server.data_dir().join("feed.json")).unwrap())
            .unwrap();
    assert_eq!(ledger[1]["caption"], "caption 1");
    assert_eq!(
        format!("saved_images/{}", ledger[1]["image"].as_str().unwrap()),
        first_path
    );
}

#[test_log::test(tokio::test)]
async fn test_stored_image_is_served() {
    let server = TestServer::new().await;
    let (_, feed) = server.post_multipart(&[("image", png_bytes(4, 4).as_slice())]).await;
    let path = feed[0][0].as_str().unwrap();

    let (status, body) = server
        .send(
            Request::get(format!("/{}", path))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        image::guess_format(&body).unwrap(),
        ImageFormat::Jpeg
    );
}

#[test_log::test(tokio::test)]
async fn test_submit_without_image_is_a_noop() {
    let server = TestServer::new().await;
    server.post_multipart(&[("image", png_bytes(4, 4).as_slice())]).await;
    let (_, before) = server.get_json("/api/feed").await;

    let (status, after) = server.post_multipart(&[("other", &b"hello"[..])]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before, after);

    let (status, after) = server.post_multipart(&[("image", &b""[..])]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before, after);
}

#[test_log::test(tokio::test)]
async fn test_submit_garbage_is_rejected() {
    let server = TestServer::new().await;
    let (status, body) = server
        .post_multipart(&[("image", &b"definitely not an image"[..])])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unsupported image"));

    let (_, feed) = server.get_json("/api/feed").await;
    assert_eq!(feed, serde_json::json!([]));
}

/// PNG of RGB noise, large enough that compression cannot shrink it much.
fn noisy_png_bytes(side: u32) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(side, side, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        };
        image::Rgb([next(), next(), next()])
    }));
    let mut data = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

#[test_log::test(tokio::test)]
async fn test_storage_failure_is_a_server_error() {
    let server = TestServer::new().await;
    let (_, before) = server.post_multipart(&[("image", png_bytes(4, 4).as_slice())]).await;

    let image_dir = server.data_dir().join("saved_images");
    std::fs::remove_dir_all(&image_dir).unwrap();
    std::fs::write(&image_dir, "").unwrap();

    let (status, body) = server.post_multipart(&[("image", png_bytes(4, 4).as_slice())]).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, after) = server.get_json("/api/feed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before, after);
}

#[test_log::test(tokio::test)]
async fn test_upload_over_limit_is_rejected() {
    let server = TestServer::with_env(&[("MAX_UPLOAD_BYTES", "1024")]).await;
    let png = noisy_png_bytes(64);
    assert!(png.len() > 1024);

    let (status, body) = server.post_multipart(&[("image", png.as_slice())]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, feed) = server.get_json("/api/feed").await;
    assert_eq!(feed, serde_json::json!([]));
    assert!(!server.data_dir().join("feed.json").exists());

    let (status, _) = server.post_multipart(&[("image", png_bytes(4, 4).as_slice())]).await;
    assert_eq!(status, StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn test_index_capture_source_follows_user_agent() {
    let server = TestServer::new().await;

    let request = Request::get("/")
        .header(
            header::USER_AGENT,
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148",
        )
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body)
        .unwrap()
        .contains(r#"capture="environment""#));

    let request = Request::get("/")
        .header(
            header::USER_AGENT,
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0",
        )
        .body(Body::empty())
        .unwrap();
    let (_, body) = server.send(request).await;
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Image Captioning Feed"));
    assert!(!page.contains("capture=\"environment\""));
}
