//! Shared integration test infrastructure.

#![allow(dead_code)]

pub mod harness;
