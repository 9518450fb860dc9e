use ai::blip::BLIPModel;
use anyhow::Context;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Server settings, read from the environment (and `.env`).
/// Every variable is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// holds `saved_images/` and `feed.json`
    pub data_dir: PathBuf,
    /// holds the caption model weights
    pub resources_dir: PathBuf,
    pub blip_model_file: String,
    pub blip_tokenizer_file: String,
    pub blip_model_type: BLIPModel,
    pub caption_timeout: Duration,
    pub model_offload: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let data_dir = match lookup("LOCAL_DATA_DIR") {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir().context("failed to read current dir")?,
        };
        let resources_dir = lookup("LOCAL_RESOURCES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("resources"));

        Ok(Self {
            host: parse_or(&lookup, "FEED_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(&lookup, "FEED_PORT", DEFAULT_PORT)?,
            data_dir,
            resources_dir,
            blip_model_file: lookup("BLIP_MODEL_FILE")
                .unwrap_or_else(|| "blip-image-captioning-large-q4k.gguf".to_string()),
            blip_tokenizer_file: lookup("BLIP_TOKENIZER_FILE")
                .unwrap_or_else(|| "tokenizer.json".to_string()),
            blip_model_type: parse_or(&lookup, "BLIP_MODEL_TYPE", BLIPModel::Large)?,
            caption_timeout: Duration::from_secs(parse_or(&lookup, "CAPTION_TIMEOUT_SECS", 120)?),
            model_offload: Duration::from_secs(parse_or(&lookup, "MODEL_OFFLOAD_SECS", 300)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn blip_model_path(&self) -> PathBuf {
        self.resources_dir.join(&self.blip_model_file)
    }

    pub fn blip_tokenizer_path(&self) -> PathBuf {
        self.resources_dir.join(&self.blip_tokenizer_file)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {}={:?}: {}", key, value, e)),
        None => Ok(default),
    }
}
