use ndarray::ArrayView1;

/// Returns `Σ xᵢyᵢ`.
///
/// # Panics
/// If `x` and `y` have different lengths.
pub fn inner_product(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    x.dot(&y)
}

/// Returns the correlation coefficient of `x` and `y`: the centered covariance over the product
/// of the norms of `x` and `y`.
///
/// The `1/(n-1)` normalization is left out since it cancels in the quotient. The norms are not
/// centered, so the result matches Pearson's coefficient only for zero mean inputs. A zero or
/// empty vector gives NaN.
///
/// # Panics
/// If `x` and `y` have different lengths.
pub fn correlation_coeff(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let x_centered = &x - x.mean().unwrap_or(f64::NAN);
    let y_centered = &y - y.mean().unwrap_or(f64::NAN);

    let cov = inner_product(x_centered.view(), y_centered.view());
    let var_x = inner_product(x, x);
    let var_y = inner_product(y, y);
    cov / (var_x * var_y).sqrt()
}

/// Returns the cosine of the angle between `x` and `y`. A zero vector gives NaN.
///
/// # Panics
/// If `x` and `y` have different lengths.
pub fn cosine_similarity(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let inner_prod = inner_product(x, y);
    let norm_x = inner_product(x, x);
    let norm_y = inner_product(y, y);
    inner_prod / (norm_x * norm_y).sqrt()
}
