//! Mail relay — a two-step chat form that forwards a message to an email address.

pub mod channels;
pub mod config;
pub mod delivery;
pub mod error;
pub mod relay;
