/// Shannon entropy of a weighted distribution from its running sums
///
/// With `p_i = w_i / W`, `-Σ p_i ln p_i` rearranges to `ln W - (Σ w_i ln w_i) / W`,
/// so a cell only needs the sum of its weights and the sum of `w ln w`.
/// Returns 0 for an empty or weightless distribution.
pub fn shannon_entropy_from_sums(sum_of_weights: f64, sum_of_weight_log_weights: f64) -> f64 {
    if sum_of_weights <= 0.0 {
        return 0.0;
    }
    sum_of_weights.ln() - sum_of_weight_log_weights / sum_of_weights
}

/// Shannon entropy of a set of positive weights
///
/// Non-positive weights contribute nothing.
pub fn shannon_entropy(weights: &[f64]) -> f64 {
    let (sum, sum_log) = weights
        .iter()
        .filter(|&&weight| weight > 0.0)
        .fold((0.0, 0.0), |(sum, sum_log), &weight| {
            (sum + weight, weight.mul_add(weight.ln(), sum_log))
        });
    shannon_entropy_from_sums(sum, sum_log)
}
