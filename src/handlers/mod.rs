//! HTTP request boundary: DTOs, validation, and per-module routers.

pub mod chat;
pub mod checkout;
pub mod common;
pub mod health;
pub mod orders;
pub mod payments;
pub mod recommendations;
pub mod webhooks;
