//! Wire types shared by the chatroom gateway and its clients.

pub mod frames;
pub mod payloads;
pub mod methods;
