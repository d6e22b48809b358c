//! Xaveco - trial and entitlement backend for a conversation suggestion app.
//!
//! Clients identified by an opaque device id get a small trial allowance,
//! then pay for a weekly premium period through Stripe Checkout.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
