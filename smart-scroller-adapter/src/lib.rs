//! Adapter utilities for the `smart-scroller` crate.
//!
//! The `smart-scroller` crate is UI-agnostic: it talks to a [`smart_scroller::ScrollHost`] and a
//! [`smart_scroller::ChangeFeed`] and leaves both to the adapter. This crate provides small,
//! framework-neutral pieces commonly needed when wiring it up or testing an integration:
//!
//! - [`SimHost`]: a headless vertical-stack scroll container
//! - [`Controller`]: owns host, feed and engine, and turns UI-level calls (append, prepend,
//!   resize, media load, user scroll) into the notifications a real host would deliver
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui/DOM bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod sim;


pub use controller::{Controller, SimScroller};
pub use sim::{SimHost, SimNode};
