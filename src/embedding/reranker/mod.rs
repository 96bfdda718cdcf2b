pub mod config;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_BATCH_SIZE, MAX_SEQ_LEN, RerankerConfig};

use candle_core::Tensor;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::embedding::bert::BertClassifier;
use crate::embedding::device::select_device;
use crate::embedding::error::{ModelError, ModelKind};
use crate::embedding::lexical::overlap_score;
use crate::embedding::utils::{load_batch_tokenizer, missing_model_file};

/// Cross-encoder that scores `(query, document)` pairs jointly.
///
/// Without a model directory it runs a lexical-overlap stub, which keeps tests and local
/// runs free of model downloads.
pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<(BertClassifier, Tokenizer)>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, ModelError> {
        config
            .validate()
            .map_err(|reason| ModelError::InvalidConfig {
                model: ModelKind::Reranker,
                reason,
            })?;

        let device = select_device();
        debug!(?device, "Selected compute device for reranker");

        let Some(model_path) = config.model_path.clone() else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
            });
        };

        if !model_path.exists() {
            return Err(ModelError::ModelNotFound {
                model: ModelKind::Reranker,
                path: model_path,
            });
        }

        if let Some(missing) = missing_model_file(&model_path) {
            return Err(ModelError::LoadFailed {
                model: ModelKind::Reranker,
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        info!(
            model_path = %model_path.display(),
            batch_size = config.batch_size,
            "Loading reranker model"
        );

        let model = BertClassifier::load(&model_path, &device).map_err(|e| {
            ModelError::LoadFailed {
                model: ModelKind::Reranker,
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        let tokenizer = load_batch_tokenizer(&model_path, config.max_seq_len).map_err(|e| {
            ModelError::LoadFailed {
                model: ModelKind::Reranker,
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Reranker model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some((model, tokenizer)),
        })
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, ModelError> {
        let scores = self.score_batch(query, &[candidate])?;
        scores
            .first()
            .copied()
            .ok_or_else(|| ModelError::Inference {
                model: ModelKind::Reranker,
                reason: "model returned no score".to_string(),
            })
    }

    /// Scores every candidate against `query`, one value per candidate, in input order.
    ///
    /// Pairs are pushed through the model `batch_size` at a time.
    pub fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, ModelError> {
        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring query-candidate pairs"
        );

        let Some((model, tokenizer)) = &self.model else {
            return Ok(candidates
                .iter()
                .map(|candidate| overlap_score(query, candidate))
                .collect());
        };

        let mut scores = Vec::with_capacity(candidates.len());
        for chunk in candidates.chunks(self.config.batch_size) {
            let pairs: Vec<(&str, &str)> = chunk.iter().map(|c| (query, *c)).collect();
            let encodings = tokenizer.encode_batch(pairs, true).map_err(|e| {
                ModelError::Tokenization {
                    model: ModelKind::Reranker,
                    reason: e.to_string(),
                }
            })?;

            let input_ids = self.stack(&encodings, Encoding::get_ids)?;
            let type_ids = self.stack(&encodings, Encoding::get_type_ids)?;
            let attention_mask = self.stack(&encodings, Encoding::get_attention_mask)?;

            let logits = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;
            scores.extend(logits.flatten_all()?.to_vec1::<f32>()?);
        }

        if scores.len() != candidates.len() {
            return Err(ModelError::Inference {
                model: ModelKind::Reranker,
                reason: format!(
                    "expected {} scores, model produced {}",
                    candidates.len(),
                    scores.len()
                ),
            });
        }

        Ok(scores)
    }

    /// Packs one per-token field of a padded batch into a `[batch, seq_len]` tensor.
    fn stack(
        &self,
        encodings: &[Encoding],
        field: fn(&Encoding) -> &[u32],
    ) -> Result<Tensor, ModelError> {
        let seq_len = encodings.first().map(|e| field(e).len()).unwrap_or(0);
        let data: Vec<u32> = encodings
            .iter()
            .flat_map(|e| field(e).iter().copied())
            .collect();

        Ok(Tensor::from_vec(
            data,
            (encodings.len(), seq_len),
            &self.device,
        )?)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &candle_core::Device {
        &self.device
    }
}
