use super::{InferenceBackend, PromptTokenizer};
use crate::errors::{util::to_generation_error, BenchError, BenchResult};
use candle_core::quantized::gguf_file;
use candle_core::{Device, Tensor, D};
use candle_transformers::models::{quantized_llama, quantized_qwen2};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const TOKENIZER_FILE: &str = "tokenizer.json";

/// Quantized GGUF models run through candle on CPU.
///
/// `qwen2` weights size their rotary tables from `qwen2.context_length`, so long prompts
/// fit. Every other architecture is read as llama, whose tables stop at
/// [`quantized_llama::MAX_SEQ_LEN`] positions.
pub struct CandleBackend {
    device: Device,
}

impl Default for CandleBackend {
    fn default() -> Self {
        Self::new(Device::Cpu)
    }
}

impl CandleBackend {
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

enum Weights {
    Llama(quantized_llama::ModelWeights),
    Qwen2(quantized_qwen2::ModelWeights),
}

pub struct CandleModel {
    weights: Weights,
    device: Device,
    max_seq_len: usize,
    eos_token: Option<u32>,
}

impl CandleModel {
    /// Positions the model can attend over, prompt and generated tokens together
    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }
}

/// One forward pass returning the greedy next token
pub trait ForwardPass {
    fn next_token(&mut self, input: &[u32], index_pos: usize) -> BenchResult<u32>;
}

impl CandleModel {
    fn forward_argmax(&mut self, input: &[u32], index_pos: usize) -> candle_core::Result<u32> {
        let input = Tensor::new(input, &self.device)?.unsqueeze(0)?;
        let logits = match &mut self.weights {
            Weights::Llama(w) => w.forward(&input, index_pos)?,
            Weights::Qwen2(w) => w.forward(&input, index_pos)?,
        };
        logits.squeeze(0)?.argmax(D::Minus1)?.to_scalar::<u32>()
    }
}

impl ForwardPass for CandleModel {
    fn next_token(&mut self, input: &[u32], index_pos: usize) -> BenchResult<u32> {
        self.forward_argmax(input, index_pos)
            .map_err(|e| to_generation_error(e, "forward pass"))
    }
}

/// Greedy decoding of up to `max_tokens` tokens after `prompt_ids`.
///
/// The first pass runs at position 0, which discards any KV cache, so every call
/// prefills the whole prompt. Stops early on `eos`.
pub fn greedy_decode<F: ForwardPass>(
    model: &mut F,
    prompt_ids: &[u32],
    max_tokens: usize,
    max_seq_len: usize,
    eos: Option<u32>,
) -> BenchResult<Vec<u32>> {
    if prompt_ids.is_empty() {
        return Err(BenchError::GenerationError(
            "prompt encodes to zero tokens".to_string(),
        ));
    }
    // the last generated token is never fed back
    let positions = prompt_ids.len() + max_tokens.saturating_sub(1);
    if positions > max_seq_len {
        return Err(BenchError::GenerationError(format!(
            "prompt of {} tokens plus {} generated needs {} positions, model supports {}",
            prompt_ids.len(),
            max_tokens,
            positions,
            max_seq_len
        )));
    }

    let mut generated = Vec::with_capacity(max_tokens);
    let mut input = prompt_ids.to_vec();
    let mut index_pos = 0;
    for _ in 0..max_tokens {
        let next = model.next_token(&input, index_pos)?;
        index_pos += input.len();
        generated.push(next);
        if Some(next) == eos {
            break;
        }
        input = vec![next];
    }
    Ok(generated)
}

pub struct HfTokenizer(Tokenizer);

impl HfTokenizer {
    pub fn from_file(path: &Path) -> BenchResult<Self> {
        Tokenizer::from_file(path)
            .map(Self)
            .map_err(|e| BenchError::TokenizerError(format!("{}: {}", path.display(), e)))
    }

    fn decode(&self, ids: &[u32]) -> BenchResult<String> {
        self.0
            .decode(ids, true)
            .map_err(|e| BenchError::TokenizerError(e.to_string()))
    }
}

impl PromptTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> BenchResult<Vec<u32>> {
        let encoding = self
            .0
            .encode(text, true)
            .map_err(|e| BenchError::TokenizerError(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }
}

/// Resolve the GGUF weights and tokenizer for a model path.
///
/// A directory must hold exactly one `.gguf` file next to `tokenizer.json`; a `.gguf`
/// file path looks for `tokenizer.json` in its parent directory.
pub fn resolve_model_files(path: &Path) -> BenchResult<(PathBuf, PathBuf)> {
    let (weights, dir) = if path.is_dir() {
        let mut ggufs = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "gguf"))
            .collect::<Vec<_>>();
        if ggufs.len() != 1 {
            return Err(BenchError::ModelLoadError(format!(
                "expected one .gguf file in {}, found {}",
                path.display(),
                ggufs.len()
            )));
        }
        (ggufs.remove(0), path.to_path_buf())
    } else if path.is_file() {
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (path.to_path_buf(), dir)
    } else {
        return Err(BenchError::ModelLoadError(format!(
            "model path does not exist: {}",
            path.display()
        )));
    };

    let tokenizer = dir.join(TOKENIZER_FILE);
    if !tokenizer.is_file() {
        return Err(BenchError::ModelLoadError(format!(
            "{} not found next to {}",
            TOKENIZER_FILE,
            weights.display()
        )));
    }
    Ok((weights, tokenizer))
}

impl InferenceBackend for CandleBackend {
    type Model = CandleModel;
    type Tokenizer = HfTokenizer;

    fn name(&self) -> &str {
        "candle"
    }

    fn load(&self, path: &Path) -> BenchResult<(CandleModel, HfTokenizer)> {
        let (weights_path, tokenizer_path) = resolve_model_files(path)?;
        tracing::info!(
            weights = %weights_path.display(),
            tokenizer = %tokenizer_path.display(),
            "loading gguf model"
        );

        let mut file = File::open(&weights_path)?;
        let content = gguf_file::Content::read(&mut file)
            .map_err(|e| BenchError::ModelLoadError(e.with_path(&weights_path).to_string()))?;
        let architecture = content
            .metadata
            .get("general.architecture")
            .and_then(|v| v.to_string().ok())
            .cloned()
            .unwrap_or_else(|| "llama".to_string());

        let (weights, max_seq_len) = if architecture == "qwen2" {
            let context_length = content
                .metadata
                .get("qwen2.context_length")
                .and_then(|v| v.to_u32().ok())
                .map(|n| n as usize)
                .ok_or_else(|| {
                    BenchError::ModelLoadError("qwen2.context_length missing".to_string())
                })?;
            let weights = quantized_qwen2::ModelWeights::from_gguf(content, &mut file, &self.device)
                .map_err(|e| BenchError::ModelLoadError(e.to_string()))?;
            (Weights::Qwen2(weights), context_length)
        } else {
            let weights = quantized_llama::ModelWeights::from_gguf(content, &mut file, &self.device)
                .map_err(|e| BenchError::ModelLoadError(e.to_string()))?;
            (Weights::Llama(weights), quantized_llama::MAX_SEQ_LEN)
        };
        tracing::info!(%architecture, max_seq_len, "gguf weights loaded");

        let tokenizer = HfTokenizer::from_file(&tokenizer_path)?;
        let eos_token = ["</s>", "<|endoftext|>", "<|eot_id|>", "<|im_end|>"]
            .iter()
            .find_map(|t| tokenizer.0.token_to_id(t));

        let model = CandleModel {
            weights,
            device: self.device.clone(),
            max_seq_len,
            eos_token,
        };
        Ok((model, tokenizer))
    }

    fn materialize(&self, _model: &mut CandleModel) -> BenchResult<()> {
        self.device
            .synchronize()
            .map_err(|e| BenchError::ModelLoadError(e.to_string()))
    }

    fn generate(
        &self,
        model: &mut CandleModel,
        tokenizer: &HfTokenizer,
        prompt: &str,
        max_tokens: usize,
    ) -> BenchResult<String> {
        let prompt_ids = tokenizer.encode(prompt)?;
        let max_seq_len = model.max_seq_len;
        let eos = model.eos_token;
        let generated = greedy_decode(model, &prompt_ids, max_tokens, max_seq_len, eos)?;
        tokenizer.decode(&generated)
    }
}
