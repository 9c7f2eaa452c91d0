//! In-process memory backends
//!
//! Adapters for the session, semantic and relational store ports. They keep
//! everything in process memory, which suits the CLI and tests; networked
//! backends implement the same ports.

mod graph;
mod session;
mod vector;

pub use graph::InMemoryGraphStore;
pub use session::InMemorySessionStore;
pub use vector::InMemoryVectorStore;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
