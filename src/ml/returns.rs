/// Standard deviations below this are treated as zero when normalizing.
pub const MIN_RETURN_STD: f32 = 1.0e-8;

/// Discounted returns `G_t = r_t + gamma * G_{t+1}`, accumulated from the last step backwards.
pub fn discount_rewards(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running_sum = 0.0f32;
    for (t, reward) in rewards.iter().enumerate().rev() {
        running_sum = running_sum * gamma + reward;
        returns[t] = running_sum;
    }
    returns
}

/// Standardizes `returns` in place to zero mean and unit population variance.
///
/// A degenerate episode (a single step, or identical returns) has no spread to
/// scale by; every entry becomes `0.0` instead.
pub fn normalize_returns(returns: &mut [f32]) {
    if returns.is_empty() {
        return;
    }
    let count = returns.len() as f64;
    let mean = returns.iter().map(|&g| g as f64).sum::<f64>() / count;
    let variance = returns
        .iter()
        .map(|&g| {
            let centered = g as f64 - mean;
            centered * centered
        })
        .sum::<f64>()
        / count;
    let std = variance.sqrt();
    if !std.is_finite() || std < MIN_RETURN_STD as f64 {
        returns.fill(0.0);
        return;
    }
    for value in returns.iter_mut() {
        *value = ((*value as f64 - mean) / std) as f32;
    }
}
