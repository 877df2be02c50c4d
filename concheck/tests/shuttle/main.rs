#![cfg(feature = "shuttle")]
mod common;
mod objects;
