pub mod channel;
pub mod executor;
pub mod hierarchy;
pub mod interpreter;
pub mod logger;
pub mod resolver;
pub mod settings;
pub mod types;
pub mod wildcard;
