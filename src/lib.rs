//! Agent Earnings Library
//!
//! This library provides the task lifecycle simulation behind the agent
//! earnings dashboard: the agent and task model, the lifecycle engine that
//! moves tasks through their timed states, derived statistics, and the
//! dashboard view built on top of them.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod lifecycle;
pub mod presentation;
