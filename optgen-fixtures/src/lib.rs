//! Structs compiled together with their generated options.

pub mod models;
pub mod network;
pub mod options;
