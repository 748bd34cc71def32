// Application layer - Use cases and the seams they depend on
pub mod aggregator;
pub mod auth_service;
pub mod monitor_service;
pub mod random_source;
pub mod sample_generator;
pub mod sampling_loop;
pub mod scheduler;
pub mod settings_service;
