//! Core fee billing logic for Tahsil.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `invoice` - Challan lifecycle and status rules
//! - `ledger` - Append-only double-entry student ledger, aging, defaulters
//! - `routing` - Hierarchical bank account resolution
//! - `posting` - Batch invoice generation planning
//! - `reconciliation` - Payment application and reversal planning
//! - `reminder` - Rule-driven dunning reminder engine

pub mod invoice;
pub mod ledger;
pub mod posting;
pub mod reconciliation;
pub mod reminder;
pub mod routing;
