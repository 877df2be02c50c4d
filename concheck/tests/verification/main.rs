#![cfg(not(feature = "shuttle"))]
mod common;
mod configuration;
mod scenarios;
mod snapshot;
