// Candidate screening: prompt building, the single provider call, response
// parsing and result export. All provider calls go through llm_client.

pub mod export;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod prompts;
