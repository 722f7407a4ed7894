//! Core business logic for Haushalt.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! It works on an in-memory [`budget::BudgetSnapshot`] and never mutates it.
//!
//! # Modules
//!
//! - `budget` - Budget records, validation, entry status and templates
//! - `aggregation` - Monthly amounts, payroll, totals and summaries
//! - `export` - CSV export of yearly summaries

pub mod aggregation;
pub mod budget;
pub mod export;
