pub mod cli;
pub mod engine;
pub mod logging;
pub mod monitor;
pub mod node;
pub mod oracle;
pub mod resilience;
pub mod risk;
pub mod types;
