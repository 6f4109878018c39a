pub mod api_runner;
pub mod prefill_runner;
