//! Model loading.
//!
//! Loading happens once, before any prediction request is accepted. Any
//! failure is returned immediately so the caller never starts with a missing
//! model.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::PredictError;
use crate::models::{LinearModel, Predictor, RemotePredictor};

/// Where the model comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// A JSON linear-regression artifact on disk.
    File(PathBuf),
    /// An HTTP inference endpoint.
    ///
    /// Loading checks the URL and builds the client; it does not contact the
    /// endpoint, since the protocol has no health route. An unreachable server
    /// therefore surfaces on the first estimate, as `ModelUnavailable`.
    Remote { url: String, timeout: Duration },
}

/// Load the configured model into a shareable predictor.
pub fn load_predictor(source: &ModelSource) -> Result<Arc<dyn Predictor>, PredictError> {
    let predictor: Arc<dyn Predictor> = match source {
        ModelSource::File(path) => Arc::new(LinearModel::load(path)?),
        ModelSource::Remote { url, timeout } => Arc::new(RemotePredictor::new(url, *timeout)?),
    };
    let model = predictor.info();
    match &model.endpoint {
        Some(endpoint) => info!(kind = model.kind, %endpoint, "remote model configured; first estimate checks connectivity"),
        None => info!(kind = model.kind, name = %model.name, "model ready"),
    }
    Ok(predictor)
}
