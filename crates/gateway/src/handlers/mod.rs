//! API handlers module

pub mod health;
pub mod papers;
pub mod tags;
