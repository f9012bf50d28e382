pub mod catalogue;
pub mod execution;
pub mod models;
pub mod registry;
pub mod resolve;
pub mod runner;
pub mod template;
