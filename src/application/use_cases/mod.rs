pub mod pipeline;
pub mod prompt_builder;
pub mod sql_synthesizer;
