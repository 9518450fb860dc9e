mod image_caption;

use crate::{loader, HandlerPayload};
use futures::Future;
pub use image_caption::*;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub trait Model {
    type Item;
    type Output;

    fn process(
        &mut self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<anyhow::Result<Self::Output>>>> + Send;

    fn batch_size_limit(&self) -> usize;
}

pub type BatchHandlerTx<Item, Output> = mpsc::Sender<HandlerPayload<Item, Output>>;

/// Cloneable handle to a model running on its own thread.
///
/// The model is created lazily on the first request and dropped again after
/// `offload_duration` without requests. When every handle is dropped the
/// worker thread exits.
#[derive(Debug)]
pub struct AIModel<TItem, TOutput> {
    model_id: String, // for better logging
    tx: BatchHandlerTx<TItem, TOutput>,
}

impl<TItem, TOutput> Clone for AIModel<TItem, TOutput> {
    fn clone(&self) -> Self {
        Self {
            model_id: self.model_id.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<TItem, TOutput> AIModel<TItem, TOutput>
where
    TItem: Send + Sync + Clone + Debug + 'static,
    TOutput: Send + Sync + Debug + 'static,
{
    /// `offload_duration: None` keeps the model in memory once loaded.
    pub fn new<T, TFut, TFn>(
        model_id: impl Into<String>,
        create_model: TFn,
        offload_duration: Option<Duration>,
    ) -> anyhow::Result<Self>
    where
        T: Model<Item = TItem, Output = TOutput> + Send + 'static,
        TFut: Future<Output = anyhow::Result<T>> + Send + 'static,
        TFn: Fn() -> TFut + Send + 'static,
    {
        let model_id = model_id.into();
        let loader = loader::ModelLoader::new(create_model);
        let (tx, mut rx) = mpsc::channel::<HandlerPayload<TItem, TOutput>>(512);

        let idle = offload_duration.unwrap_or_default();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let thread_model_id = model_id.clone();
        std::thread::Builder::new()
            .name(format!("ai-model-{}", model_id))
            .spawn(move || {
                let local = tokio::task::LocalSet::new();

                local.spawn_local(async move {
                    let model_id = thread_model_id;
                    loop {
                        tokio::select! {
                            _ = tokio::time::sleep(idle), if offload_duration.is_some() => {
                                if loader.is_loaded().await {
                                    tracing::debug!(%model_id, "no message received for {:?}, offload model", idle);
                                    loader.offload().await;
                                }
                            }
                            payload = rx.recv() => {
                                match payload {
                                    Some((items, result_tx)) => {
                                        // If the receiver is gone nobody is waiting for
                                        // the result, skip the work.
                                        if result_tx.is_closed() {
                                            continue;
                                        }

                                        if let Err(e) = loader.load().await {
                                            tracing::error!(%model_id, "failed to load model: {}", e);
                                            if result_tx.send(Err(anyhow::anyhow!("failed to load model: {}", e))).is_err() {
                                                tracing::error!("failed to send results");
                                            }
                                            continue;
                                        }

                                        let mut model = loader.model.lock().await;
                                        let results = match model.as_mut() {
                                            Some(model) if items.len() > model.batch_size_limit() => {
                                                Err(anyhow::anyhow!(
                                                    "too many items: {} > {}",
                                                    items.len(),
                                                    model.batch_size_limit()
                                                ))
                                            }
                                            Some(model) => model.process(items).await,
                                            None => Err(anyhow::anyhow!("no valid model")),
                                        };

                                        if result_tx.send(results).is_err() {
                                            tracing::error!("failed to send results");
                                        }
                                    }
                                    None => {
                                        // all tx has been dropped
                                        if loader.is_loaded().await {
                                            tracing::info!(%model_id, "all handles dropped, offload model and end loop");
                                            loader.offload().await;
                                        }
                                        break;
                                    }
                                }
                            }
                        }
                    }
                });

                rt.block_on(local);
            })?;

        Ok(Self { model_id, tx })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    #[tracing::instrument(name = "AIModel::process", err(Debug), skip_all, fields(model_id=%self.model_id))]
    pub async fn process(&self, items: Vec<TItem>) -> anyhow::Result<Vec<anyhow::Result<TOutput>>> {
        let (result_tx, rx) = oneshot::channel();
        if let Err(e) = self.tx.send((items, result_tx)).await {
            anyhow::bail!("failed to send items: {:?}", e);
        }
        tracing::debug!("items sent to model");

        match rx.await {
            Ok(result) => result,
            Err(e) => {
                anyhow::bail!("failed to receive results: {:?}", e);
            }
        }
    }

    #[tracing::instrument(name = "AIModel::process_single", err(Debug), skip_all, fields(model_id=%self.model_id))]
    pub async fn process_single(&self, item: TItem) -> anyhow::Result<TOutput> {
        let results = self.process(vec![item]).await?;
        let result = results
            .into_iter()
            .next()
            .ok_or(anyhow::anyhow!("no result"))??;
        Ok(result)
    }
}
