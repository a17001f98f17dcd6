//! Railstorm - combat resolution core for an on-rails arcade shooter

pub mod combo;
pub mod core;
pub mod director;
pub mod events;
pub mod hazard;
pub mod powerup;
pub mod weakpoint;
pub mod weapon;
