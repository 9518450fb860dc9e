#[cfg(feature = "accelerate")]
extern crate accelerate_src;

use crate::traits::{ImageCaptionInput, ImageCaptionOutput};
use crate::Model;
use anyhow::anyhow;
use candle_core::{DType, Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::blip::VisionConfig;
use candle_transformers::models::quantized_blip;
use candle_transformers::models::{blip, blip_text};
use image::{imageops::FilterType, DynamicImage, RgbImage};
use std::path::Path;
use strum_macros::{AsRefStr, EnumString};
use tokenizers::Tokenizer;
use tracing::debug;

const IMAGE_SIZE: u32 = 384;
const BOS_TOKEN_ID: u32 = 30522;
const SEP_TOKEN_ID: u32 = 102;
const MAX_CAPTION_TOKENS: usize = 1000;

pub struct BLIP {
    tokenizer: Tokenizer,
    model: quantized_blip::BlipForConditionalGeneration,
    logits_processor: LogitsProcessor,
    device: Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
pub enum BLIPModel {
    Base,
    Large,
}

fn blip_base_config() -> blip::Config {
    let text_config = blip_text::Config {
        vocab_size: 30524,
        hidden_size: 768,
        encoder_hidden_size: 768,
        intermediate_size: 3072,
        projection_dim: 768,
        num_hidden_layers: 12,
        num_attention_heads: 12,
        max_position_embeddings: 512,
        hidden_act: candle_nn::Activation::Gelu,
        layer_norm_eps: 1e-12,
        is_decoder: true,
    };
    let vision_config = VisionConfig {
        hidden_size: 768,
        intermediate_size: 3072,
        projection_dim: 512,
        num_hidden_layers: 12,
        num_attention_heads: 12,
        image_size: IMAGE_SIZE as usize,
        patch_size: 16,
        hidden_act: candle_nn::Activation::Gelu,
        layer_norm_eps: 1e-5,
    };

    blip::Config {
        text_config,
        vision_config,
        projection_dim: 512,
        image_text_hidden_size: 256,
    }
}

impl Model for BLIP {
    type Item = ImageCaptionInput;
    type Output = ImageCaptionOutput;

    fn batch_size_limit(&self) -> usize {
        1
    }

    async fn process(
        &mut self,
        items: Vec<Self::Item>,
    ) -> anyhow::Result<Vec<anyhow::Result<Self::Output>>> {
        let mut results = vec![];

        for item in items {
            let res = self.get_caption(&item.image, item.prompt.as_deref());
            results.push(res);
        }

        Ok(results)
    }
}

impl BLIP {
    pub async fn new(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        model_type: BLIPModel,
    ) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(tokenizer_path.as_ref()).map_err(|e| {
            anyhow!(
                "failed to initialize tokenizer from {}: {}",
                tokenizer_path.as_ref().display(),
                e
            )
        })?;

        let logits_processor = LogitsProcessor::new(1337, None, None);

        let config = match model_type {
            BLIPModel::Base => blip_base_config(),
            BLIPModel::Large => blip::Config::image_captioning_large(),
        };

        let device = if cfg!(feature = "metal") {
            Device::new_metal(0)?
        } else {
            Device::Cpu
        };

        debug!(
            "loading blip {} weights from {}",
            model_type.as_ref(),
            model_path.as_ref().display()
        );
        let vb = quantized_blip::VarBuilder::from_gguf(model_path, &device)?;
        let model = quantized_blip::BlipForConditionalGeneration::new(&config, vb)?;

        Ok(Self {
            tokenizer,
            model,
            logits_processor,
            device,
        })
    }

    fn get_caption(&mut self, image: &RgbImage, prompt: Option<&str>) -> anyhow::Result<String> {
        debug!(
            "generating caption for {}x{} image",
            image.width(),
            image.height()
        );
        let image = preprocess(image)?.to_device(&self.device)?;
        let image_embeds = image.unsqueeze(0)?.apply(self.model.vision_model())?;

        let mut token_ids = vec![BOS_TOKEN_ID];
        if let Some(prompt) = prompt {
            let encoding = self
                .tokenizer
                .encode(prompt, false)
                .map_err(|e| anyhow!("failed to encode prompt: {}", e))?;
            token_ids.extend_from_slice(encoding.get_ids());
        }

        // we need this to make multi time generation work
        self.model.text_decoder().reset_kv_cache();

        for index in 0..MAX_CAPTION_TOKENS {
            let context_size = if index > 0 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self
                .model
                .text_decoder()
                .forward(&input_ids, &image_embeds)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = self.logits_processor.sample(&logits)?;
            if token == SEP_TOKEN_ID {
                break;
            }
            token_ids.push(token);
        }

        let caption = self
            .tokenizer
            .decode(&token_ids, true)
            .map_err(|e| anyhow!("failed to decode caption: {}", e))?;

        Ok(caption.trim().to_string())
    }
}

/// Resize to fill 384x384 and normalize with the CLIP mean/std, channels first.
fn preprocess(image: &RgbImage) -> candle_core::Result<Tensor> {
    let img = DynamicImage::ImageRgb8(image.clone())
        .resize_to_fill(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();
    let data = img.into_raw();
    let size = IMAGE_SIZE as usize;
    let data = Tensor::from_vec(data, (size, size, 3), &Device::Cpu)?.permute((2, 0, 1))?;
    let mean =
        Tensor::new(&[0.48145466f32, 0.4578275, 0.40821073], &Device::Cpu)?.reshape((3, 1, 1))?;
    let std =
        Tensor::new(&[0.26862954f32, 0.261_302_6, 0.275_777_1], &Device::Cpu)?.reshape((3, 1, 1))?;
    (data.to_dtype(DType::F32)? / 255.)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)
}
