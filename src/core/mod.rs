pub mod embedding;
pub mod index;
pub mod llm;
pub mod logging;
pub mod quiz;
