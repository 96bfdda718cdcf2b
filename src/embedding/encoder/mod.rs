//! Sentence encoder for the miner's document index.
//!
//! Use [`EncoderConfig::stub`] for tests and local runs without model files. The stub
//! hashes content words into buckets, so texts that share words land close together and
//! nearest-neighbour search still behaves sensibly.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::embedding::bert::BertPooler;
use crate::embedding::device::select_device;
use crate::embedding::error::{ModelError, ModelKind};
use crate::embedding::lexical::content_words;
use crate::embedding::utils::{load_batch_tokenizer, missing_model_file};

enum EncoderBackend {
    Model {
        pooler: BertPooler,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Produces L2-normalised embeddings.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, ModelError> {
        config
            .validate()
            .map_err(|reason| ModelError::InvalidConfig {
                model: ModelKind::Encoder,
                reason,
            })?;

        let Some(model_path) = config.model_path.clone() else {
            warn!("Sentence encoder running in STUB mode");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                embedding_dim: config.embedding_dim,
                config,
            });
        };

        if !model_path.exists() {
            return Err(ModelError::ModelNotFound {
                model: ModelKind::Encoder,
                path: model_path,
            });
        }
        if let Some(missing) = missing_model_file(&model_path) {
            return Err(ModelError::LoadFailed {
                model: ModelKind::Encoder,
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        let device = select_device();
        debug!(?device, "Selected compute device for encoder");

        let pooler =
            BertPooler::load(&model_path, &device).map_err(|e| ModelError::LoadFailed {
                model: ModelKind::Encoder,
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;
        let tokenizer = load_batch_tokenizer(&model_path, config.max_seq_len).map_err(|e| {
            ModelError::LoadFailed {
                model: ModelKind::Encoder,
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let embedding_dim = pooler.hidden_size();
        info!(
            model_path = %model_path.display(),
            embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                pooler,
                tokenizer,
                device,
            },
            config,
            embedding_dim,
        })
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(EncoderConfig::stub())
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let mut batch = self.embed_batch(&[text])?;
        batch.pop().ok_or_else(|| ModelError::Inference {
            model: ModelKind::Encoder,
            reason: "encoder returned no embedding".to_string(),
        })
    }

    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ModelError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        match &self.backend {
            EncoderBackend::Model {
                pooler,
                tokenizer,
                device,
            } => self.embed_with_model(texts, pooler, tokenizer, device),
            EncoderBackend::Stub => Ok(texts.iter().map(|t| self.embed_stub(t)).collect()),
        }
    }

    fn embed_with_model(
        &self,
        texts: &[&str],
        pooler: &BertPooler,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, ModelError> {
        let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            ModelError::Tokenization {
                model: ModelKind::Encoder,
                reason: e.to_string(),
            }
        })?;

        let stack = |field: fn(&Encoding) -> &[u32]| -> Result<Tensor, ModelError> {
            let seq_len = encodings.first().map(|e| field(e).len()).unwrap_or(0);
            let data: Vec<u32> = encodings
                .iter()
                .flat_map(|e| field(e).iter().copied())
                .collect();
            Ok(Tensor::from_vec(data, (encodings.len(), seq_len), device)?)
        };

        let input_ids = stack(Encoding::get_ids)?;
        let type_ids = stack(Encoding::get_type_ids)?;
        let attention_mask = stack(Encoding::get_attention_mask)?;

        debug!(
            batch = texts.len(),
            seq_len = input_ids.dim(1)?,
            "Encoding batch"
        );

        let pooled = pooler.forward(&input_ids, &type_ids, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;

        Ok(rows.into_iter().map(normalize).collect())
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.embedding_dim];

        for word in content_words(text) {
            let digest = blake3::hash(word.as_bytes());
            let bytes = digest.as_bytes();
            let bucket = crate::hashing::hash_to_u64(bytes) as usize % self.embedding_dim;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        normalize(embedding)
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}
