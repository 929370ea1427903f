//! Q-learning agent with an online and a target learner.
mod base;
mod config;
pub use base::Agent;
pub use config::AgentConfig;
