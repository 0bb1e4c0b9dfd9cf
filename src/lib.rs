pub mod api;
pub mod core;
pub mod input;
pub mod prompt;
pub mod report;
