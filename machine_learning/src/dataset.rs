use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// An in-memory supervised dataset, one sample per row of `x` and `y`.
///
/// The dataset is never mutated after creation, every pass over it shuffles an index permutation
/// instead of the rows themselves.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The feature matrix, `N×D`.
    /// * `y` - The label matrix, `N×1` for scalar regression.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the amount of rows differ.
    pub fn new(x: Array2<f32>, y: Array2<f32>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                a: "features",
                b: "labels",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    /// Returns the amount of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the amount of features per sample.
    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    /// Returns the amount of labels per sample.
    pub fn y_size(&self) -> usize {
        self.y.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f32> {
        self.y.view()
    }

    /// Shuffles the sample order and splits it into batches.
    ///
    /// Every call draws a new permutation, so calling it again starts a new pass over the data.
    /// The last batch holds the remainder when `batch_size` does not divide the dataset's length.
    ///
    /// # Arguments
    /// * `batch_size` - The maximum amount of samples per batch.
    /// * `rng` - The random number generator used for shuffling.
    ///
    /// # Returns
    /// An iterator over the batches of one pass.
    pub fn batches<R: Rng>(&self, batch_size: NonZeroUsize, rng: &mut R) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        Batches {
            dataset: self,
            order,
            batch_size,
            cursor: 0,
        }
    }

    /// Gathers the given rows into an owned batch.
    fn gather(&self, rows: &[usize]) -> (Array2<f32>, Array2<f32>) {
        (
            self.x.select(Axis(0), rows),
            self.y.select(Axis(0), rows),
        )
    }
}

/// A single shuffled pass over a `Dataset`.
pub struct Batches<'a> {
    dataset: &'a Dataset,
    order: Vec<usize>,
    batch_size: NonZeroUsize,
    cursor: usize,
}

impl Batches<'_> {
    /// Returns the sample indices of this pass, in batch order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

impl Iterator for Batches<'_> {
    type Item = (Array2<f32>, Array2<f32>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size.get()).min(self.order.len());
        let batch = self.dataset.gather(&self.order[self.cursor..end]);
        self.cursor = end;

        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.batch_size.get());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}
