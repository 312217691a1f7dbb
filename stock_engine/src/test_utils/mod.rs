//! Fakes and helpers for exercising the engine without a real channel or disk.
pub mod memory_store;
pub mod prepare_env;
pub mod scripted_channel;
