//! # bridge-core
//!
//! Core types for the bridge sync engine.
//!
//! This crate holds everything that does no I/O:
//! - Source entities (organizations, teams, users) and target entities (groups, users)
//! - Sync bookkeeping records (mapping rows, audit entries)
//! - Operation, outcome, role and state enums
//! - The deterministic id scheme
//! - The name/role mapper and the target statements it produces
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod mapper;
pub mod statement;
