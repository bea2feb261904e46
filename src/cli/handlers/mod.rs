// src/cli/handlers/mod.rs

// One module per command. Each handler parses its own arguments.

pub mod alias;
pub mod commons;
pub mod repair;
pub mod unalias;
