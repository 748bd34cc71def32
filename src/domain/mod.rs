// Domain layer - Pure value types and rules
pub mod dashboard;
pub mod filter;
pub mod history;
pub mod sample;
pub mod settings;
pub mod summary;
pub mod view;
