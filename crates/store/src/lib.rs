//! Ledger adapters: `SqliteLedger` for durable logs, `MemoryLedger` for
//! dry runs and tests.

pub mod memory;
pub mod sqlite;
