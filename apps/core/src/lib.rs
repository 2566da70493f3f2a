//! Neri: a rule-based, persona-driven chat assistant.
//!
//! The [`brain`] turns one inbound message into at most one reply; [`services`]
//! holds the weather provider and the delivery channels; [`handler`] wires a
//! raw update through both.

pub mod brain;
pub mod config;
pub mod error;
pub mod handler;
pub mod models;
pub mod services;

#[cfg(test)]
mod tests;
