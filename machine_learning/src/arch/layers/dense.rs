use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result};

/// A fully connected layer without activation, `z = x·W + b`.
///
/// The layer does not own its parameters, they are read from a flat slice laid out as the
/// `dim_in×dim_out` weight matrix (row major) followed by the `dim_out` biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    size: usize,

    // Forward metadata
    x: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output dimensions of the layer.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            x: Array2::zeros((0, dim.0)),
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the amount of weights, the biases being the rest of the layer's parameters.
    pub fn weights_size(&self) -> usize {
        self.size - self.dim.1
    }

    /// Computes the layer's output without keeping any metadata for the backward pass.
    ///
    /// # Arguments
    /// * `params` - This layer's parameter slice.
    /// * `x` - A batch of inputs, one per row.
    ///
    /// # Returns
    /// The output batch or an error if the shapes don't match.
    pub fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                a: "input",
                b: "dense layer",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;
        Ok(z)
    }

    /// Computes the layer's output and keeps the input for the backward pass.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.predict(params, x)?;
        self.x = x.to_owned();
        Ok(z)
    }

    /// Writes this layer's gradient given the delta of its output.
    ///
    /// # Arguments
    /// * `grad` - This layer's gradient slice, overwritten with `[xᵀ·d, Σ d]`.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    pub fn backward(&mut self, grad: &mut [f32], d: ArrayView2<f32>) -> Result<()> {
        if d.dim() != (self.x.nrows(), self.dim.1) {
            return Err(MlErr::SizeMismatch {
                a: "delta",
                b: "forwarded batch",
                got: d.nrows(),
                expected: self.x.nrows(),
            });
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));
        Ok(())
    }

    /// Returns the derivative of the loss with respect to this layer's input, `d·Wᵀ`, the delta
    /// of the previous layer.
    pub fn input_delta(&self, params: &[f32], d: ArrayView2<f32>) -> Result<Array2<f32>> {
        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("grad", grad.len())?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.weights_size());
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw)?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    pub fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("params", params.len())?;

        let (w_raw, b_raw) = params.split_at(self.weights_size());
        let weights = ArrayView2::from_shape(self.dim, w_raw)?;
        let biases = ArrayView1::from_shape(self.dim.1, b_raw)?;
        Ok((weights, biases))
    }

    fn check_len(&self, what: &'static str, len: usize) -> Result<()> {
        if len != self.size {
            return Err(MlErr::SizeMismatch {
                a: what,
                b: "dense layer",
                got: len,
                expected: self.size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn size_counts_biases() {
        let dense = Dense::new((2, 3));
        assert_eq!(dense.size(), 9);
        assert_eq!(dense.weights_size(), 6);
    }

    #[test]
    fn forward_is_affine() {
        let mut dense = Dense::new((2, 1));
        let params = [2.0, -3.4, 4.2];
        let x = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

        let z = dense.forward(&params, x.view()).unwrap();
        let expected: Array2<f32> = array![[6.2], [0.8], [2.8]];

        for (got, want) in z.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn backward_writes_closed_form_gradient() {
        let mut dense = Dense::new((2, 1));
        let params = [0.5, -1.0, 0.25];
        let x = array![[1.0, 2.0], [3.0, -1.0]];
        dense.forward(&params, x.view()).unwrap();

        let d = array![[1.0], [-2.0]];
        let mut grad = [0.0; 3];
        dense.backward(&mut grad, d.view()).unwrap();

        // dW = xᵀ·d, db = Σ d
        assert_eq!(grad, [1.0 - 6.0, 2.0 + 2.0, -1.0]);
    }

    #[test]
    fn input_delta_is_d_times_wt() {
        let dense = Dense::new((2, 1));
        let params = [0.5, -1.0, 0.25];
        let d = array![[1.0], [-2.0]];

        let d_prev = dense.input_delta(&params, d.view()).unwrap();
        let expected: Array2<f32> = array![[0.5, -1.0], [-1.0, 2.0]];
        assert_eq!(d_prev, expected);
    }

    #[test]
    fn rejects_wrong_input_width() {
        let dense = Dense::new((2, 1));
        let x = Array2::<f32>::zeros((4, 3));

        let err = dense.predict(&[0.0; 3], x.view()).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { got: 3, expected: 2, .. }));
    }

    #[test]
    fn rejects_wrong_param_len() {
        let dense = Dense::new((2, 1));
        let x = Array2::<f32>::zeros((4, 2));

        let err = dense.predict(&[0.0; 2], x.view()).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { a: "params", .. }));
    }
}
