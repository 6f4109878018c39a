//! In-process inference backends.
//!
//! A backend loads a model together with its tokenizer and exposes the single
//! generation call the prefill benchmark times. Generation must process the whole
//! prompt before the first output token is produced, so requesting one token
//! measures prefill.

#[cfg(feature = "candle")]
pub mod candle;
pub mod mock;

use crate::errors::BenchResult;
use std::path::Path;

/// Tokenizer handed out by [`InferenceBackend::load`]
pub trait PromptTokenizer {
    fn encode(&self, text: &str) -> BenchResult<Vec<u32>>;

    fn count_tokens(&self, text: &str) -> BenchResult<usize> {
        Ok(self.encode(text)?.len())
    }
}

pub trait InferenceBackend {
    type Model;
    type Tokenizer: PromptTokenizer;

    /// Short identifier used in logs
    fn name(&self) -> &str;

    fn load(&self, path: &Path) -> BenchResult<(Self::Model, Self::Tokenizer)>;

    /// Finish any deferred weight loading so it is not attributed to a trial
    fn materialize(&self, _model: &mut Self::Model) -> BenchResult<()> {
        Ok(())
    }

    fn generate(
        &self,
        model: &mut Self::Model,
        tokenizer: &Self::Tokenizer,
        prompt: &str,
        max_tokens: usize,
    ) -> BenchResult<String>;
}

#[cfg(feature = "candle")]
pub use self::candle::CandleBackend;
pub use self::mock::MockBackend;
