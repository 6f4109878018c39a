pub mod api;
pub mod prefill;
