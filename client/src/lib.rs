//! Client side of clipcap: backend HTTP client, upload flow controller,
//! creator chat controller and creator memory sync.

pub mod api;
pub mod chat;
pub mod config;
pub mod flow;
pub mod logging;
pub mod memory;
pub mod models;
pub mod pipeline;
