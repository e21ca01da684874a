//! Interview Flow - conversational interview engine and simulation harness
//!
//! This crate implements a time-budgeted interview state machine that walks
//! a bot through breadth, depth, consent and data-collection phases, a set
//! of turn-level quality evaluators, and a persona-driven simulator that
//! plays many conversations in parallel and reports on their quality.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
