use crate::Model;
use futures::Future;
use std::pin::Pin;
use tokio::sync::Mutex;
use tracing::debug;

pub(crate) type CreateModelFn<T> =
    Box<dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>> + Send>;

/// Holds a model that is created on first use and can be dropped to free memory.
pub(crate) struct ModelLoader<T>
where
    T: Model,
{
    pub model: Mutex<Option<T>>,
    create_model_fn: CreateModelFn<T>,
}

impl<T> ModelLoader<T>
where
    T: Model,
{
    pub fn new<TFut, TFn>(create_model: TFn) -> Self
    where
        TFut: Future<Output = anyhow::Result<T>> + Send + 'static,
        TFn: Fn() -> TFut + Send + 'static,
    {
        Self {
            model: Mutex::new(None),
            create_model_fn: Box::new(move || Box::pin(create_model())),
        }
    }

    pub async fn load(&self) -> anyhow::Result<()> {
        let mut current_model = self.model.lock().await;

        if current_model.is_none() {
            debug!("loading model");
            let model = (self.create_model_fn)().await?;
            *current_model = Some(model);
        }

        Ok(())
    }

    pub async fn offload(&self) {
        let mut current_model = self.model.lock().await;
        *current_model = None;
    }

    pub async fn is_loaded(&self) -> bool {
        self.model.lock().await.is_some()
    }
}
