use crate::Config;
use ai::{blip::BLIP, AIModel, ImageCaptionModel};

/// The caption model is created once per process. Weights are loaded on the
/// first request and offloaded after `model_offload` without requests.
pub fn init_caption_model(config: &Config) -> anyhow::Result<ImageCaptionModel> {
    let model_path = config.blip_model_path();
    let tokenizer_path = config.blip_tokenizer_path();
    let model_type = config.blip_model_type;

    for path in [&model_path, &tokenizer_path] {
        if !path.exists() {
            tracing::warn!(
                "{} does not exist, captioning will fail until it is provided",
                path.display()
            );
        }
    }

    AIModel::new(
        format!("blip-{}", model_type.as_ref().to_lowercase()),
        move || {
            let model_path = model_path.clone();
            let tokenizer_path = tokenizer_path.clone();
            async move { BLIP::new(model_path, tokenizer_path, model_type).await }
        },
        Some(config.model_offload),
    )
}
