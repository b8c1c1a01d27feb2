pub mod cache;
pub mod queue;
