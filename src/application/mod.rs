pub mod use_cases;

pub use use_cases::pipeline::QueryPipeline;
pub use use_cases::prompt_builder::SqlPromptBuilder;
pub use use_cases::sql_synthesizer::SqlSynthesizer;
