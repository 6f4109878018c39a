use crate::errors::{util::ensure_prompt_exists, BenchResult};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;

/// Length of the random session id appended to every HTTP prompt
pub const SESSION_ID_LEN: usize = 16;

/// Default prompt file shipped next to the benchmark binaries
pub const DEFAULT_PROMPT_FILE: &str = "benchmark_40k.txt";

/// Read the whole prompt file
pub fn load_prompt(path: &Path) -> BenchResult<String> {
    ensure_prompt_exists(path)?;
    Ok(std::fs::read_to_string(path)?)
}

/// Random alphanumeric id that keeps the backend from reusing a cached prefill
pub fn session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SESSION_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Base prompt followed by the session marker line
pub fn with_session_marker(base: &str, session_id: &str) -> String {
    format!("{}\n[Session: {}] Reply with just OK.", base, session_id)
}
