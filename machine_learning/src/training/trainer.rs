use std::{cell::RefCell, num::NonZeroUsize, rc::Rc};

use log::{debug, info};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::{
    MlErr, Result,
    arch::{Model, Sequential, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct Trainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    grad: Vec<f32>,
    optimizer: O,
    loss_fn: L,
    model: M,

    batch_size: NonZeroUsize,
    epochs: NonZeroUsize,
    init_std_dev: f32,
    rng: Rc<RefCell<R>>,
}

impl<M, O, L, R> Trainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The optimizer that updates the parameters after each batch.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `batch_size` - The maximum amount of samples per batch.
    /// * `epochs` - The amount of passes over the dataset per `fit` call.
    /// * `init_std_dev` - The standard deviation of the initial weights.
    /// * `rng` - A random number generator, used for initialization and shuffling.
    pub fn new(
        model: M,
        optimizer: O,
        loss_fn: L,
        batch_size: NonZeroUsize,
        epochs: NonZeroUsize,
        init_std_dev: f32,
        rng: R,
    ) -> Self {
        Self {
            grad: vec![0.0; model.size()],
            model,
            optimizer,
            loss_fn,
            batch_size,
            epochs,
            init_std_dev,
            rng: Rc::new(RefCell::new(rng)),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Performs one optimization step over a single batch.
    ///
    /// # Arguments
    /// * `params` - The model's parameters, updated in place.
    /// * `x` - The batch inputs.
    /// * `y` - The batch expected outputs.
    ///
    /// # Returns
    /// The batch loss, measured before the update.
    pub fn step(
        &mut self,
        params: &mut [f32],
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<f32> {
        self.model.step(
            params,
            &mut self.grad,
            &self.loss_fn,
            &mut self.optimizer,
            x,
            y,
        )
    }

    /// Computes the loss over the entire dataset.
    pub fn evaluate(&self, params: &[f32], dataset: &Dataset) -> Result<f32> {
        let y_pred = self.model.predict(params, dataset.x())?;
        Ok(self.loss_fn.loss(y_pred.view(), dataset.y()))
    }
}

impl<M, O, L, R> Trainer<M, O, L, R>
where
    M: Model + Clone,
    O: Optimizer,
    L: LossFn,
    R: Rng + 'static,
{
    /// Draws a fresh set of parameters for the model.
    ///
    /// # Returns
    /// The parameters or an error if the model's generator falls short.
    pub fn initialize_parameters(&mut self) -> Result<Vec<f32>> {
        let size = self.model.size();
        let mut param_gen = self.model.param_gen(self.rng.clone(), self.init_std_dev)?;
        let params = param_gen.sample(size).unwrap_or_default();

        if params.len() != size {
            return Err(MlErr::SizeMismatch {
                a: "initial params",
                b: "model",
                got: params.len(),
                expected: size,
            });
        }

        Ok(params)
    }

    /// Trains a freshly initialized model over `dataset`.
    ///
    /// # Returns
    /// The trained parameters along with the loss after each epoch.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<Fitted<M>> {
        self.fit_with(dataset, |_, _| {})
    }

    /// Same as `fit`, calling `on_epoch` with the epoch number (starting at 1) and the loss over
    /// the entire dataset once every epoch's updates are done.
    pub fn fit_with<F>(&mut self, dataset: &Dataset, mut on_epoch: F) -> Result<Fitted<M>>
    where
        F: FnMut(usize, f32),
    {
        let mut params = self.initialize_parameters()?;
        let epochs = self.epochs.get();
        let mut losses = Vec::with_capacity(epochs);

        debug!(
            "training {} params over {} samples, {} epochs",
            params.len(),
            dataset.len(),
            epochs
        );

        for epoch in 1..=epochs {
            let batches = dataset.batches(self.batch_size, &mut *self.rng.borrow_mut());
            self.model.backprop(
                &mut params,
                &mut self.grad,
                &self.loss_fn,
                &mut self.optimizer,
                batches,
            )?;

            let loss = self.evaluate(&params, dataset)?;
            info!("epoch {epoch}: loss {loss}");

            on_epoch(epoch, loss);
            losses.push(loss);
        }

        Ok(Fitted {
            model: self.model.clone(),
            params,
            losses,
        })
    }
}

/// The outcome of `Trainer::fit`.
#[derive(Debug, Clone)]
pub struct Fitted<M: Model> {
    model: M,
    params: Vec<f32>,
    losses: Vec<f32>,
}

impl<M: Model> Fitted<M> {
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// Returns the loss over the entire dataset after each epoch.
    pub fn losses(&self) -> &[f32] {
        &self.losses
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.model.predict(&self.params, x)
    }
}

impl Fitted<Sequential> {
    /// Returns the weights of the first layer, the whole model for linear regression.
    pub fn weights(&self) -> Result<ArrayView2<'_, f32>> {
        let (weights, _) = self.model.view_layer(&self.params, 0)?;
        Ok(weights)
    }

    pub fn bias(&self) -> Result<ArrayView1<'_, f32>> {
        let (_, bias) = self.model.view_layer(&self.params, 0)?;
        Ok(bias)
    }
}
