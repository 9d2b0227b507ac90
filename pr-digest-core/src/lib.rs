#![doc = "pr-digest-core: core logic library for pr-digest."]

//! This crate holds the classification engine, the text/report builders and the
//! digest orchestration. Network clients live in the `pr-digest` crate and plug in
//! through the traits in [`contract`].
//!
//! # Usage
//! Compile a [`config::RuleConfig`] into [`rules::CompiledRules`], then feed each
//! PR's files to [`analysis::analyze_files`], or run a whole digest with
//! [`digest::run_digest`].

pub mod analysis;
pub mod classify;
pub mod config;
pub mod contract;
pub mod digest;
pub mod error;
pub mod report;
pub mod rules;
pub mod summary;
