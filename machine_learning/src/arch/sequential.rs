use std::{cell::RefCell, rc::Rc};

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use super::{Model, layers::Dense};
use crate::{
    MlErr, Result,
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The parameters of the layers are stored contiguously, in layer order.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Creates the single dense layer model used for linear regression.
    ///
    /// # Arguments
    /// * `num_inputs` - The amount of features of each sample.
    pub fn linear(num_inputs: usize) -> Self {
        Self::new([Dense::new((num_inputs, 1))])
    }

    /// Views the weights and biases of the `idx`-th layer inside `params`.
    ///
    /// # Returns
    /// The weights and biases or an error if `params` doesn't fit the model.
    pub fn view_layer<'a>(
        &self,
        params: &'a [f32],
        idx: usize,
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_params(params)?;

        let nlayers = self.layers.len();
        let layer = self.layers.get(idx).ok_or(MlErr::SizeMismatch {
            a: "layer index",
            b: "layers",
            got: idx,
            expected: nlayers,
        })?;

        let offset: usize = self.layers[..idx].iter().map(Dense::size).sum();
        layer.view_params(&params[offset..offset + layer.size()])
    }

    fn check_params(&self, params: &[f32]) -> Result<()> {
        let size = self.size();

        if params.len() != size {
            return Err(MlErr::SizeMismatch {
                a: "params",
                b: "model",
                got: params.len(),
                expected: size,
            });
        }

        Ok(())
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    fn param_gen<R: Rng + 'static>(
        &self,
        rng: Rc<RefCell<R>>,
        std_dev: f32,
    ) -> Result<Box<dyn ParamGen>> {
        let mut param_gens: Vec<Box<dyn ParamGen>> = Vec::with_capacity(self.layers.len() * 2);

        for layer in &self.layers {
            let weights = RandParamGen::normal(rng.clone(), layer.weights_size(), 0.0, std_dev)?;
            param_gens.push(Box::new(weights));
            param_gens.push(Box::new(ConstParamGen::new(0.0, layer.dim().1)));
        }

        Ok(Box::new(ChainedParamGen::new(param_gens)))
    }

    fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let mut out = x.to_owned();
        let mut offset = 0;

        for layer in &mut self.layers {
            let size = layer.size();
            out = layer.forward(&params[offset..offset + size], out.view())?;
            offset += size;
        }

        Ok(out)
    }

    fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_params(params)?;

        let mut out = x.to_owned();
        let mut offset = 0;

        for layer in &self.layers {
            let size = layer.size();
            out = layer.predict(&params[offset..offset + size], out.view())?;
            offset += size;
        }

        Ok(out)
    }

    fn backward(&mut self, params: &[f32], grad: &mut [f32], d: ArrayView2<f32>) -> Result<()> {
        self.check_params(params)?;
        self.check_params(grad)?;

        let mut d = d.to_owned();
        let mut end = params.len();

        for (idx, layer) in self.layers.iter_mut().enumerate().rev() {
            let start = end - layer.size();
            layer.backward(&mut grad[start..end], d.view())?;

            // The first layer has no predecessor to propagate to.
            if idx > 0 {
                d = layer.input_delta(&params[start..end], d.view())?;
            }

            end = start;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{arch::loss::Mse, optimization::GradientDescent};

    #[test]
    fn size_sums_layers() {
        let model = Sequential::new([Dense::new((3, 2)), Dense::new((2, 1))]);
        assert_eq!(model.size(), 8 + 3);
    }

    #[test]
    fn param_gen_zeroes_biases() {
        let model = Sequential::new([Dense::new((2, 2)), Dense::new((2, 1))]);
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(5)));

        let params = model
            .param_gen(rng, 0.01)
            .unwrap()
            .sample(model.size())
            .unwrap();

        assert_eq!(params.len(), 9);
        assert_eq!(&params[4..6], &[0.0, 0.0]);
        assert_eq!(params[8], 0.0);
        assert!(params[..4].iter().chain(&params[6..8]).all(|w| *w != 0.0));
    }

    #[test]
    fn view_layer_splits_params() {
        let model = Sequential::linear(2);
        let params = [2.0, -3.4, 4.2];

        let (w, b) = model.view_layer(&params, 0).unwrap();
        assert_eq!(w.shape(), &[2, 1]);
        assert_eq!(w[[1, 0]], -3.4);
        assert_eq!(b[0], 4.2);

        assert!(model.view_layer(&params, 1).is_err());
    }

    #[test]
    fn forward_matches_predict() {
        let mut model = Sequential::new([Dense::new((2, 2)), Dense::new((2, 1))]);
        let params = [1.0, 0.5, -1.0, 2.0, 0.1, 0.2, 3.0, -1.0, 0.5];
        let x: Array2<f32> = array![[1.0, 2.0], [-1.0, 0.5]];

        let predicted = model.predict(&params, x.view()).unwrap();
        let forwarded = model.forward(&params, x.view()).unwrap();
        assert_eq!(predicted, forwarded);
    }

    #[test]
    fn backward_chains_layers() {
        let mut model = Sequential::new([Dense::new((1, 1)), Dense::new((1, 1))]);
        let params = [2.0, 0.0, 3.0, 0.0];
        let x: Array2<f32> = array![[1.0]];

        let y_pred = model.forward(&params, x.view()).unwrap();
        assert_eq!(y_pred[[0, 0]], 6.0);

        let mut grad = [0.0; 4];
        let d: Array2<f32> = array![[1.0]];
        model.backward(&params, &mut grad, d.view()).unwrap();

        // Second layer: dW = h·d = 2, db = 1. First layer receives d·w2 = 3.
        assert_eq!(grad, [3.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn linear_backward_is_the_layer_gradient() {
        let mut model = Sequential::linear(2);
        let params = [0.5, -1.0, 0.25];
        let x: Array2<f32> = array![[1.0, 2.0], [3.0, -1.0]];
        model.forward(&params, x.view()).unwrap();

        let mut grad = [0.0; 3];
        let d: Array2<f32> = array![[1.0], [-2.0]];
        model.backward(&params, &mut grad, d.view()).unwrap();

        assert_eq!(grad, [-5.0, 4.0, -1.0]);
    }

    #[test]
    fn backprop_steps_every_batch() {
        let mut model = Sequential::linear(1);
        let mut optimizer = GradientDescent::new(0.1);
        let mut params = [0.0, 0.0];
        let mut grad = [0.0; 2];

        let batches = vec![
            (array![[1.0]], array![[2.0]]),
            (array![[2.0]], array![[4.0]]),
        ];
        model
            .backprop(&mut params, &mut grad, &Mse, &mut optimizer, batches.into_iter())
            .unwrap();

        // First step: d = -4, w = b = 0.4. Second: ŷ = 1.2, d = -5.6, dW = -11.2, db = -5.6.
        assert!((params[0] - 1.52).abs() < 1e-6, "got {}", params[0]);
        assert!((params[1] - 0.96).abs() < 1e-6, "got {}", params[1]);
    }

    #[test]
    fn rejects_short_params() {
        let mut model = Sequential::linear(2);
        let x = Array2::<f32>::zeros((1, 2));

        let err = model.forward(&[0.0; 2], x.view()).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                a: "params",
                b: "model",
                got: 2,
                expected: 3,
            }
        );
    }
}
