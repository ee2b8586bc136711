//! Command handlers for the askroute CLI.

mod ask;
mod chat;

pub use ask::AskCommand;
pub use chat::ChatCommand;
