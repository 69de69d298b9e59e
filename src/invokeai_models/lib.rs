//! # invokeai-models Architecture
//!
//! A reconciliation library with a CLI client, not the other way around.
//! Everything from `api.rs` inward takes plain Rust values and returns
//! plain Rust values; the binary is the only place that knows about
//! terminals, prompts, and exit codes.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                            │
//! │  - Parses arguments, renders tables, confirms on stdin   │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                      │
//! │  - ModelsApi<D: ModelDatabase>, dispatch only            │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                           │
//! │  - One module per CLI command, returns CmdResult         │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Engines and stores                                      │
//! │  - reconcile: diff + sync plan (the core algorithm)      │
//! │  - scanner: models-tree walk                             │
//! │  - cache: TTL-backed listing store                       │
//! │  - snapshot: rotating database copies + restore          │
//! │  - db: ModelDatabase trait, SQLite + in-memory impls     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key invariants
//!
//! - The reconciliation diff is one-directional: rows without files.
//!   It never reports files without rows.
//! - Every mutating batch is transactional; a sync is always preceded by
//!   a fresh snapshot, so a rollback point exists before the first write.
//! - The snapshot list is bounded; rotation evicts strictly oldest-first.
//! - Cache and metadata files carry an explicit schema version so a format
//!   change is detected instead of silently misread.
//!
//! ## Testing
//!
//! Commands are tested against [`db::memory::InMemoryModelStore`] without
//! touching SQLite; the SQLite store has its own tests over temporary
//! database files; `tests/` drives the compiled binary end to end.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod scanner;
pub mod snapshot;
