//! A fully connected feedforward neural network engine.
//!
//! The engine trains against exactly one input vector and one target vector:
//! every epoch runs a forward pass, evaluates the loss and applies a single
//! gradient-descent step computed by backpropagation.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod config;
pub mod error;
pub mod feed_forward;
pub mod loss;
pub mod matrix;
pub mod topology;
pub mod trainer;

mod layer;
mod utils;

pub use activator::Activator;
pub use config::Session;
pub use error::{Error, Result};
pub use feed_forward::{Comparison, Network, DEFAULT_LEARNING_RATE};
pub use loss::Loss;
pub use matrix::{Mat, Vector};
pub use topology::{Parameters, Topology};
pub use trainer::{Logging, Progress, Report, Trainer};
