//! ONNX sentence-embedding classification backend.
//!
//! Embeds clause text with a sentence-transformers model (mean pooling over
//! the attention mask, L2-normalised) and scores labels by softmax over
//! cosine similarity to per-label centroid vectors. The model directory
//! must contain `model.onnx` and `tokenizer.json`; centroids come from a
//! JSON file mapping label → vector.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use lexrisk_core::LabelScore;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::backend::{BackendError, ClauseBackend};

const MAX_TOKENS: usize = 256;

/// Embedding-based classification backend.
pub struct SemanticBackend {
    name: String,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    /// Unit-norm centroids, parallel to `labels`.
    centroids: Vec<Vec<f32>>,
    dim: usize,
}

impl SemanticBackend {
    /// Load the model, tokenizer, and label centroids.
    pub fn load(model_dir: &Path, centroids_path: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        let raw: BTreeMap<String, Vec<f32>> =
            serde_json::from_str(&std::fs::read_to_string(centroids_path)?)?;
        anyhow::ensure!(!raw.is_empty(), "no centroids in {centroids_path:?}");

        let dim = raw.values().next().map(|v| v.len()).unwrap_or(384);
        let mut labels = Vec::with_capacity(raw.len());
        let mut centroids = Vec::with_capacity(raw.len());
        for (label, mut centroid) in raw {
            anyhow::ensure!(
                centroid.len() == dim,
                "centroid {label:?} has dim {}, expected {dim}",
                centroid.len()
            );
            normalize(&mut centroid);
            labels.push(label);
            centroids.push(centroid);
        }

        let name = format!("semantic:{}", model_dir.display());
        info!(labels = labels.len(), dim, backend = %name, "loaded semantic backend");

        Ok(Self {
            name,
            session: Mutex::new(session),
            tokenizer,
            labels,
            centroids,
            dim,
        })
    }

    /// Embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| self.inference_error(format!("tokenize: {e}")))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> =
            encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))
            .map_err(|e| self.inference_error(e.to_string()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.clone().into_boxed_slice()))
            .map_err(|e| self.inference_error(e.to_string()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
            .map_err(|e| self.inference_error(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])
            .map_err(|e| self.inference_error(e.to_string()))?;

        // Token embeddings: [1, seq_len, dim].
        let (output_shape, output_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| self.inference_error(e.to_string()))?;
        let dims: &[i64] = output_shape;
        if dims.len() != 3 || dims[2] as usize != self.dim {
            return Err(self.inference_error(format!(
                "unexpected output shape {dims:?}, expected [1, {seq_len}, {}]",
                self.dim
            )));
        }

        let actual_seq_len = dims[1] as usize;
        let mut pooled = vec![0.0f32; self.dim];
        let mut token_count = 0.0f32;
        for (j, &mask_val) in attention_mask.iter().take(actual_seq_len).enumerate() {
            if mask_val > 0 {
                let offset = j * self.dim;
                for (d, p) in pooled.iter_mut().enumerate() {
                    *p += output_data[offset + d];
                }
                token_count += mask_val as f32;
            }
        }
        if token_count > 0.0 {
            for p in &mut pooled {
                *p /= token_count;
            }
        }
        normalize(&mut pooled);
        Ok(pooled)
    }

    fn inference_error(&self, reason: String) -> BackendError {
        BackendError::Inference {
            name: self.name.clone(),
            reason,
        }
    }
}

impl ClauseBackend for SemanticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, BackendError> {
        let embedding = self.embed(text)?;

        let sims: Vec<f32> = self
            .centroids
            .iter()
            .map(|c| cosine_sim(&embedding, c))
            .collect();

        // Softmax over similarities keeps every confidence in (0,1) and
        // the whole list summing to 1.
        let max_sim = sims.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = sims.iter().map(|s| (s - max_sim).exp()).collect();
        let total: f32 = exps.iter().sum();

        let mut scores: Vec<LabelScore> = self
            .labels
            .iter()
            .zip(&exps)
            .map(|(label, &e)| LabelScore {
                label: label.clone(),
                confidence: e / total,
            })
            .collect();

        scores.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(scores)
    }
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
