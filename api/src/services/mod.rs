pub mod assistant;
pub mod captions;
pub mod error;
pub mod llm;
