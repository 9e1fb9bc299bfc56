use std::{cell::RefCell, rc::Rc};

use log::trace;
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{
    MlErr, Result, arch::loss::LossFn, initialization::ParamGen, optimization::Optimizer,
};

pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Returns a generator for the model's initial parameters: weights drawn from a zero mean
    /// gaussian with standard deviation `std_dev` and biases set to zero.
    ///
    /// # Arguments
    /// * `rng` - The random number generator for the weights.
    /// * `std_dev` - The standard deviation of the weights.
    fn param_gen<R: Rng + 'static>(
        &self,
        rng: Rc<RefCell<R>>,
        std_dev: f32,
    ) -> Result<Box<dyn ParamGen>>;

    /// Makes a forward pass keeping the metadata needed by `backward`.
    fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Makes a forward pass without touching the model's metadata.
    fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Writes into `grad` the gradient of the loss given `d`, the derivative of the loss with
    /// respect to the output of the last `forward` call.
    fn backward(&mut self, params: &[f32], grad: &mut [f32], d: ArrayView2<f32>) -> Result<()>;

    /// Performs a single optimization step over a batch.
    ///
    /// # Arguments
    /// * `params` - The model's parameters, **updated in place**.
    /// * `grad` - A buffer for writing the batch gradient.
    /// * `loss_fn` - The loss function.
    /// * `optimizer` - The optimizer that dictates how to update the parameters.
    /// * `x` - The batch inputs.
    /// * `y` - The batch expected outputs.
    ///
    /// # Returns
    /// The batch loss, measured before the update.
    fn step<L, O>(
        &mut self,
        params: &mut [f32],
        grad: &mut [f32],
        loss_fn: &L,
        optimizer: &mut O,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<f32>
    where
        L: LossFn,
        O: Optimizer,
    {
        grad.fill(0.0);

        let y_pred = self.forward(params, x)?;
        if y_pred.dim() != y.dim() {
            return Err(MlErr::SizeMismatch {
                a: "predictions",
                b: "labels",
                got: y.len(),
                expected: y_pred.len(),
            });
        }

        let loss = loss_fn.loss(y_pred.view(), y);
        let d = loss_fn.loss_prime(y_pred.view(), y);
        self.backward(params, grad, d.view())?;
        optimizer.update_params(params, grad);

        trace!("batch of {} samples, loss {loss}", x.nrows());
        Ok(loss)
    }

    /// Runs `step` over every batch, **`params` gets updated** on each of them.
    ///
    /// Batch losses are only traced, the epoch loss is measured over the whole dataset once the
    /// pass is done.
    fn backprop<L, O, I>(
        &mut self,
        params: &mut [f32],
        grad: &mut [f32],
        loss_fn: &L,
        optimizer: &mut O,
        batches: I,
    ) -> Result<()>
    where
        L: LossFn,
        O: Optimizer,
        I: Iterator<Item = (Array2<f32>, Array2<f32>)>,
    {
        for (x, y) in batches {
            self.step(params, grad, loss_fn, optimizer, x.view(), y.view())?;
        }

        Ok(())
    }
}
