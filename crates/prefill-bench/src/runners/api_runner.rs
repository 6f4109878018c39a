use crate::configuration::ApiSettings;
use crate::errors::{BenchError, BenchResult};
use crate::prompt::{load_prompt, session_id, with_session_marker};
use crate::stats::{average_speed, BenchmarkRun};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Measures prefill through an OpenAI-compatible chat-completions endpoint.
///
/// Trials are strictly sequential and only the request itself is timed. Nothing is
/// retried: a transport failure or an unexpected response aborts the benchmark.
pub struct ApiBenchmarkRunner {
    client: Client,
    settings: ApiSettings,
}

impl ApiBenchmarkRunner {
    pub fn new(settings: ApiSettings) -> BenchResult<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self { client, settings })
    }

    /// Run `runs` trials against the endpoint, writing progress to `out`
    pub async fn run<W: Write>(
        &self,
        prompt_file: &Path,
        model: &str,
        runs: usize,
        out: &mut W,
    ) -> BenchResult<Vec<BenchmarkRun>> {
        let base_prompt = load_prompt(prompt_file)?;
        let mut results = Vec::with_capacity(runs);

        for i in 0..runs {
            let prompt = with_session_marker(&base_prompt, &session_id(&mut rand::thread_rng()));
            let payload = self.create_request(model, &prompt);

            write!(out, "Run {}/{}... ", i + 1, runs)?;
            out.flush()?;

            let start = Instant::now();
            let body = self.post(&payload).await?;
            let elapsed = start.elapsed();

            let response: Value = serde_json::from_slice(&body)?;

            let run = BenchmarkRun::from_duration(prompt_tokens(&response)?, elapsed);
            writeln!(
                out,
                "{:.0}s | {} tokens | {:.0} tok/s",
                run.elapsed_seconds, run.prompt_tokens, run.tokens_per_second
            )?;
            tracing::debug!(
                run = i + 1,
                elapsed = run.elapsed_seconds,
                tokens = run.prompt_tokens,
                "chat completion finished"
            );
            results.push(run);
        }

        if runs > 1 {
            writeln!(out, "\nAverage: {:.0} tok/s", average_speed(&results))?;
        }

        Ok(results)
    }

    fn create_request(&self, model: &str, prompt: &str) -> Value {
        json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.settings.max_tokens,
            "stream": false
        })
    }

    /// Send one completion request and read the full body
    async fn post(&self, payload: &Value) -> BenchResult<Bytes> {
        let response = self
            .client
            .post(&self.settings.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, endpoint = %self.settings.endpoint, "non-success response");
        }

        Ok(response.bytes().await?)
    }
}

/// Server-reported prompt token count, 0 when the response carries no usage
pub fn prompt_tokens(response: &Value) -> BenchResult<usize> {
    let object = response.as_object().ok_or_else(|| {
        BenchError::ResponseShapeError(format!("expected a JSON object, got {}", response))
    })?;

    let usage = match object.get("usage") {
        None => return Ok(0),
        Some(Value::Object(usage)) => usage,
        Some(other) => {
            return Err(BenchError::ResponseShapeError(format!(
                "usage is not an object: {}",
                other
            )))
        }
    };

    match usage.get("prompt_tokens") {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| {
                BenchError::ResponseShapeError(format!(
                    "prompt_tokens is not a non-negative integer: {}",
                    value
                ))
            }),
    }
}
