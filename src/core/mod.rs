// src/core/mod.rs

pub mod alias_registry;
pub mod atomic_writer;
pub mod codec;
pub mod document_store;
pub mod paths;
pub mod reconcile;
pub mod settings;
pub mod unalias;
