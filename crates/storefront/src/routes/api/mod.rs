//! JSON API handlers.

pub mod checkout_event;
pub mod products;
