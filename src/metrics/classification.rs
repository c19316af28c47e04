use crate::errors::CartError;

/// Percentage of predictions that exactly match the true labels, in `[0, 100]`.
pub fn accuracy(y: &[f64], yhat: &[f64]) -> Result<f64, CartError> {
    if y.is_empty() || y.len() != yhat.len() {
        return Err(CartError::InvalidInput(format!(
            "cannot compute accuracy of {} predictions against {} labels",
            yhat.len(),
            y.len()
        )));
    }
    let correct = y.iter().zip(yhat).filter(|(y_, yhat_)| y_ == yhat_).count();
    Ok(correct as f64 / y.len() as f64 * 100.0)
}
