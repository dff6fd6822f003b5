//! Unigram language models
//!
//! A [`UnigramSample`] accumulates raw term frequencies; models derived from it
//! expose per-term probabilities and a vocabulary iteration order:
//! - [`EstimatedModel`]: estimates probabilities from a sample (MLE, Dirichlet, Jelinek-Mercer)
//! - [`SortedModel`]: iterates another model's vocabulary by descending probability
//! - [`MixtureModel`]: weighted linear combination of several models
//!
//! Derived models borrow their source and never mutate it.

mod model;
mod sample;

pub use model::{Estimator, EstimatedModel, MixtureModel, SortedModel, UnigramModel};
pub use sample::UnigramSample;
