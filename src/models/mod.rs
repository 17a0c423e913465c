//! Domain models for Bookstack

pub mod book;
pub mod loan;
pub mod user;
