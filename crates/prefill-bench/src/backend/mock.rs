use super::{InferenceBackend, PromptTokenizer};
use crate::errors::{BenchError, BenchResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Calls observed by a [`MockBackend`]
#[derive(Debug, Default, Clone)]
pub struct MockCalls {
    pub loads: Vec<PathBuf>,
    pub materialized: usize,
    pub generations: Vec<(usize, usize)>,
}

/// A backend that splits prompts on whitespace and sleeps instead of running a model
#[derive(Clone, Default)]
pub struct MockBackend {
    delays: Arc<Mutex<Vec<Duration>>>,
    calls: Arc<Mutex<MockCalls>>,
    fail_load: bool,
}

impl MockBackend {
    /// Create a mock whose successive generations take the given durations
    pub fn new(delays: Vec<Duration>) -> Self {
        Self {
            delays: Arc::new(Mutex::new(delays)),
            ..Default::default()
        }
    }

    /// Create a mock whose `load` always fails
    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Default::default()
        }
    }

    /// Snapshot of the calls made so far; clones share the same record
    pub fn calls(&self) -> MockCalls {
        self.calls.lock().unwrap().clone()
    }
}

pub struct MockModel;

pub struct WhitespaceTokenizer;

impl PromptTokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> BenchResult<Vec<u32>> {
        Ok((0..text.split_whitespace().count() as u32).collect())
    }
}

impl InferenceBackend for MockBackend {
    type Model = MockModel;
    type Tokenizer = WhitespaceTokenizer;

    fn name(&self) -> &str {
        "mock"
    }

    fn load(&self, path: &Path) -> BenchResult<(MockModel, WhitespaceTokenizer)> {
        self.calls.lock().unwrap().loads.push(path.to_path_buf());
        if self.fail_load {
            return Err(BenchError::ModelLoadError(format!(
                "mock model refused to load {}",
                path.display()
            )));
        }
        Ok((MockModel, WhitespaceTokenizer))
    }

    fn materialize(&self, _model: &mut MockModel) -> BenchResult<()> {
        self.calls.lock().unwrap().materialized += 1;
        Ok(())
    }

    fn generate(
        &self,
        _model: &mut MockModel,
        tokenizer: &WhitespaceTokenizer,
        prompt: &str,
        max_tokens: usize,
    ) -> BenchResult<String> {
        let prompt_tokens = tokenizer.count_tokens(prompt)?;
        self.calls
            .lock()
            .unwrap()
            .generations
            .push((prompt_tokens, max_tokens));

        let delay = {
            let mut delays = self.delays.lock().unwrap();
            if delays.is_empty() {
                Duration::ZERO
            } else {
                delays.remove(0)
            }
        };
        std::thread::sleep(delay);

        Ok("OK".repeat(max_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer;
        assert_eq!(tokenizer.count_tokens("one two  three\nfour").unwrap(), 4);
        assert_eq!(tokenizer.count_tokens("").unwrap(), 0);
    }

    #[test]
    fn test_calls_are_shared_between_clones() {
        let backend = MockBackend::new(vec![]);
        let observer = backend.clone();

        let (mut model, tokenizer) = backend.load(Path::new("/models/mock")).unwrap();
        backend.materialize(&mut model).unwrap();
        let text = backend.generate(&mut model, &tokenizer, "a b c", 1).unwrap();

        assert_eq!(text, "OK");
        let calls = observer.calls();
        assert_eq!(calls.loads, vec![PathBuf::from("/models/mock")]);
        assert_eq!(calls.materialized, 1);
        assert_eq!(calls.generations, vec![(3, 1)]);
    }

    #[test]
    fn test_failing_load_is_recorded() {
        let backend = MockBackend::failing_load();
        assert!(backend.load(Path::new("/models/broken")).is_err());
        assert_eq!(backend.calls().loads.len(), 1);
    }
}
