//! Core business logic for Callsheet.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `invoice` - Invoice lifecycle state machine and field normalization
//! - `allocation` - Budget-line allocation reconciliation and vendor suggestions
//! - `budget` - Budget definition parsing
//! - `dedup` - Duplicate invoice detection at ingestion
//! - `ingest` - Sequential multi-file ingestion pipeline
//! - `extraction` - AI document extraction collaborator contract
//! - `stamp` - PDF stamping collaborator contract and footer composition

pub mod allocation;
pub mod budget;
pub mod dedup;
pub mod extraction;
pub mod ingest;
pub mod invoice;
pub mod stamp;
