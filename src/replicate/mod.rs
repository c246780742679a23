pub mod client;
pub mod poll;
