pub mod commands;
pub mod config;
pub mod roulette;
pub mod scheduler;
pub mod session;
