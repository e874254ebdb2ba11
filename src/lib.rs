pub mod agent;
pub mod errors;
pub mod evaluation;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod strategy;
pub mod tools;
