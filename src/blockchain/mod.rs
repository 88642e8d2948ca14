// src/blockchain/mod.rs

pub mod client;
pub use client::{ErgoClient, UpstreamResponse};

pub mod models;
pub mod services;
