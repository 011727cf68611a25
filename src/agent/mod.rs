pub mod llm;
pub mod orchestrator;
pub mod preprocess;
pub mod tool;
pub mod types;
