//! Fit-Simulation: synthetic pose landmark generation
//!
//! Drives the counter with scripted joint motion in place of a camera and
//! pose estimator.

pub mod landmark_simulator;
pub mod motion_patterns;
pub mod real_time_stream;

pub use landmark_simulator::*;
pub use motion_patterns::*;
pub use real_time_stream::*;
