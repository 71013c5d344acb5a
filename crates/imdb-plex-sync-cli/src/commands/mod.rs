pub mod prompts;
pub mod sync;
