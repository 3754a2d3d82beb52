pub mod chat;
pub mod commands;
pub mod config;
pub mod conversations;
pub mod core;
pub mod feed;
pub mod profile;
pub mod reconciler;
pub mod sdk;
pub mod session;
pub mod storage;
pub mod uniffi;
