//! Domain layer: the storefront's data model and the ports to the remote services.
//!
//! Everything here mirrors server-owned state. Nothing in this module performs I/O.

pub mod booking;
pub mod calendar;
pub mod cart;
pub mod ids;
pub mod money;
pub mod order;
pub mod ports;
pub mod tour;
pub mod traveler;
