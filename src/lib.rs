pub mod board;
pub mod constants;
pub mod engine;
pub mod maps;
pub mod movement;
pub mod ranking;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod types;
