// Pitch generation: two decoded records in, one cover-letter paragraph out.
// All chat calls go through llm_client.

pub mod generator;
pub mod prompts;
