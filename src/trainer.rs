//! Utilities for training neural networks.

use crate::error::Result;
use crate::feed_forward::Network;
use crate::matrix::Vector;

use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// A builder for training a network on a single example.
///
/// Unlike `Network::train`, a trainer emits progress logs and can be
/// interrupted between epochs.
#[derive(Debug)]
pub struct Trainer<'a> {
    network: &'a mut Network,
    epochs: usize,
    logging: Logging,
}

impl<'a> Trainer<'a> {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * Runs 100 epochs.
    /// * Logs on training completion.
    pub fn new(network: &'a mut Network) -> Self {
        Trainer {
            network,
            epochs: 100,
            logging: Logging::Completion,
        }
    }

    /// Sets the number of epochs to run.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Trains the network for every configured epoch.
    pub fn train(self, input: &Vector, expected: &Vector) -> Result<Report> {
        self.train_with(input, expected, |_| ControlFlow::Continue(()))
    }

    /// Trains the network, calling `on_epoch` after every epoch.
    ///
    /// Returning `ControlFlow::Break` from `on_epoch` stops training before
    /// the next epoch; the network keeps every update applied so far.
    #[instrument(level = "debug", skip(self, input, expected, on_epoch), fields(epochs = self.epochs), err)]
    pub fn train_with<F>(self, input: &Vector, expected: &Vector, mut on_epoch: F) -> Result<Report>
    where
        F: FnMut(&Progress) -> ControlFlow<()>,
    {
        let start_time = Instant::now();
        let mut loss_history = Vec::with_capacity(self.epochs);
        let mut interrupted = false;
        for epoch in 1..=self.epochs {
            let progress = Progress {
                epoch,
                epochs: self.epochs,
                loss: self.network.step(input, expected)?,
            };
            loss_history.push(progress.loss);
            self.logging.iteration(&progress);
            if on_epoch(&progress).is_break() {
                interrupted = epoch < self.epochs;
                break;
            }
        }

        let report = Report {
            loss_history,
            interrupted,
            elapsed: start_time.elapsed(),
        };
        self.logging.completion(&report);
        Ok(report)
    }
}

/// The state of training after an epoch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    /// The epoch just completed, counting from 1.
    pub epoch: usize,
    /// The number of epochs requested.
    pub epochs: usize,
    /// The loss measured before this epoch's update.
    pub loss: f64,
}

impl Progress {
    /// The completed fraction of training, in `(0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.epoch as f64 / self.epochs as f64
    }
}

/// The outcome of a training run.
#[derive(Clone, Debug)]
pub struct Report {
    /// The loss of every epoch that ran, in order.
    pub loss_history: Vec<f64>,
    /// Whether training stopped before the requested number of epochs.
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl Report {
    /// The loss of the last epoch that ran.
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted at completion
    Completion,
    /// A summary will be emitted after every `n` training epochs
    Iterations(usize),
}

impl Logging {
    /// Reports roughly a hundred times over `epochs`.
    pub fn percent(epochs: usize) -> Self {
        Logging::Iterations((epochs / 100).max(1))
    }

    /// Performs logging at the current epoch of training.
    fn iteration(&self, progress: &Progress) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && progress.epoch % freq == 0 {
                info!(
                    epoch = progress.epoch,
                    epochs = progress.epochs,
                    loss = progress.loss,
                    "training"
                );
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, report: &Report) {
        if let Logging::Silent = self {
            return;
        }
        info!(
            epochs = report.loss_history.len(),
            interrupted = report.interrupted,
            elapsed = ?report.elapsed,
            final_loss = ?report.final_loss(),
            "training completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activator::Activator;
    use crate::loss::Loss;
    use ndarray::{arr1, arr2};

    fn network() -> Network {
        Network::new(
            vec![arr2(&[[0.1, 0.1], [0.1, 0.1]]), arr2(&[[0.1, 0.1]])],
            vec![arr1(&[0.1, 0.1]), arr1(&[0.1])],
            Activator::ReLU,
            Loss::MeanSquareError,
            0.1,
        )
        .unwrap()
    }

    #[test]
    fn matches_network_train() {
        let x = arr1(&[1.0, 1.0]);
        let y = arr1(&[0.0]);
        let mut a = network();
        let mut b = network();
        let report = Trainer::new(&mut a)
            .epochs(50)
            .logging(Logging::Iterations(10))
            .train(&x, &y)
            .unwrap();
        assert_eq!(report.loss_history, b.train(&x, &y, 50).unwrap());
        assert!(!report.interrupted);
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn callback_sees_every_epoch() {
        let mut n = network();
        let mut seen = Vec::new();
        let report = Trainer::new(&mut n)
            .epochs(5)
            .logging(Logging::Silent)
            .train_with(&arr1(&[1.0, 1.0]), &arr1(&[0.0]), |p| {
                seen.push((p.epoch, p.loss));
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[4].0, 5);
        assert_eq!(
            seen.iter().map(|s| s.1).collect::<Vec<_>>(),
            report.loss_history
        );
    }

    #[test]
    fn break_stops_between_epochs() {
        let mut n = network();
        let report = Trainer::new(&mut n)
            .epochs(100)
            .train_with(&arr1(&[1.0, 1.0]), &arr1(&[0.0]), |p| {
                if p.fraction() >= 0.25 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert!(report.interrupted);
        assert_eq!(report.loss_history.len(), 25);
        assert!(n.activations().is_none());
    }

    #[test]
    fn errors_abort_training() {
        let mut n = network();
        assert!(Trainer::new(&mut n)
            .epochs(3)
            .train(&arr1(&[1.0]), &arr1(&[0.0]))
            .is_err());
    }

    #[test]
    fn percent_logging_never_zero() {
        assert_eq!(Logging::percent(10), Logging::Iterations(1));
        assert_eq!(Logging::percent(1000), Logging::Iterations(10));
    }
}
