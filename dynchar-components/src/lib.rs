//! Impulse-response kernels, the two-box temperature response and the
//! characterization of time-explicit inventories.
//!
//! The entry point is [`aggregator::CharacterizationBuilder`], which turns a
//! [`dynchar_core::config::CharacterizationConfig`] and a kernel map into a
//! [`aggregator::Characterization`] that can be applied to inventories.

pub mod aggregator;
pub mod characterizer;
pub mod climate;
pub mod constants;
pub mod kernels;
pub mod method;
pub mod prospective;
