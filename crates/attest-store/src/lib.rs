//! # attest-store — RocksDB-backed persistence for Attest.
//!
//! Implements [`StateStore`](attest_core::store::StateStore) with one
//! column family per key space and atomic [`rocksdb::WriteBatch`] commits,
//! plus the deployment-level metadata the command-line front end needs
//! (ledger height counter, pinned administrator identity).

pub mod rocks;

pub use rocks::RocksStore;
