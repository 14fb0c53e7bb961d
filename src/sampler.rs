//! Random candidate sampling.
//!
//! Indices are drawn uniformly from the pool until enough distinct ones have
//! been collected; repeats are simply drawn again. Exclusions are applied to
//! the drawn notes afterwards, so a sample can come back smaller than the
//! requested size when reserved names were drawn.
//!
//! # Usage
//!
//! ```rust
//! use wordlink::sampler::{PrefixExclusion, Sampler};
//! use wordlink::Note;
//!
//! let pool: Vec<Note> = ["Apple", "PNG 1", "Cherry"].into_iter().map(Note::from).collect();
//! let sampler = Sampler::new(3).with_exclusion(PrefixExclusion::new("PNG"));
//! let sample = sampler.draw(&pool, &mut rand::thread_rng()).unwrap();
//! assert_eq!(sample.len(), 2);
//! ```

use crate::config::SamplerConfig;
use crate::models::Note;
use crate::{Error, Result};
use rand::Rng;
use std::collections::HashSet;

/// A rule that removes notes from a drawn sample.
pub trait Exclusion: Send + Sync {
    /// Returns `true` if `note` must not be used as a candidate.
    fn excludes(&self, note: &Note) -> bool;
}

impl<F> Exclusion for F
where
    F: Fn(&Note) -> bool + Send + Sync,
{
    fn excludes(&self, note: &Note) -> bool {
        self(note)
    }
}

/// Excludes notes whose name starts with a reserved prefix.
///
/// Screenshots and pasted images are saved with names such as
/// `PNG image 3` or `Screenshot 2023-04-01`, and fresh notes as `Untitled 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixExclusion {
    prefix: String,
}

impl PrefixExclusion {
    /// Creates an exclusion for `prefix` (case-sensitive).
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Exclusion for PrefixExclusion {
    fn excludes(&self, note: &Note) -> bool {
        note.name().starts_with(&self.prefix)
    }
}

/// Draws `size` distinct notes from `pool`, then drops excluded ones.
///
/// The returned notes keep their relative order from `pool`.
///
/// # Errors
///
/// Returns [`Error::SamplingImpossible`] if `size` exceeds `pool.len()`.
pub fn sample<R>(
    pool: &[Note],
    size: usize,
    exclusions: &[&dyn Exclusion],
    rng: &mut R,
) -> Result<Vec<Note>>
where
    R: Rng + ?Sized,
{
    if size > pool.len() {
        return Err(Error::SamplingImpossible {
            requested: size,
            available: pool.len(),
        });
    }

    let mut drawn = HashSet::with_capacity(size);
    while drawn.len() < size {
        drawn.insert(rng.gen_range(0..pool.len()));
    }

    Ok(pool
        .iter()
        .enumerate()
        .filter(|(index, _)| drawn.contains(index))
        .map(|(_, note)| note)
        .filter(|note| !exclusions.iter().any(|rule| rule.excludes(note)))
        .cloned()
        .collect())
}

/// A configured sample size with its exclusion rules.
pub struct Sampler {
    size: usize,
    exclusions: Vec<Box<dyn Exclusion>>,
}

impl Sampler {
    /// Creates a sampler without exclusions.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            exclusions: Vec::new(),
        }
    }

    /// Creates a sampler from configuration, with one prefix rule per
    /// configured prefix.
    #[must_use]
    pub fn from_config(config: &SamplerConfig) -> Self {
        config
            .excluded_prefixes
            .iter()
            .fold(Self::new(config.subset_size), |sampler, prefix| {
                sampler.with_exclusion(PrefixExclusion::new(prefix.clone()))
            })
    }

    /// Adds an exclusion rule.
    #[must_use]
    pub fn with_exclusion(mut self, rule: impl Exclusion + 'static) -> Self {
        self.exclusions.push(Box::new(rule));
        self
    }

    /// Requested sample size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of exclusion rules.
    #[must_use]
    pub fn exclusion_count(&self) -> usize {
        self.exclusions.len()
    }

    /// Draws a sample from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SamplingImpossible`] if the configured size exceeds
    /// the pool.
    pub fn draw<R>(&self, pool: &[Note], rng: &mut R) -> Result<Vec<Note>>
    where
        R: Rng + ?Sized,
    {
        let mut rules: Vec<&dyn Exclusion> = Vec::with_capacity(self.exclusions.len());
        for rule in &self.exclusions {
            rules.push(rule.as_ref());
        }
        let sample = sample(pool, self.size, &rules, rng)?;
        tracing::debug!(
            pool = pool.len(),
            requested = self.size,
            sampled = sample.len(),
            "Drew candidate sample"
        );
        Ok(sample)
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("size", &self.size)
            .field("exclusions", &self.exclusions.len())
            .finish()
    }
}
