/// Calculates the retry delay in milliseconds for a given attempt number.
///
/// Uses exponential backoff:
/// - Base delay: 100ms
/// - Multiplier: 2^(attempt - 1)
/// - Capped at `max_delay_ms`
///
/// # Arguments
/// * `attempt` - The current retry attempt number (1-based)
/// * `max_delay_ms` - Upper bound of the returned delay
///
/// # Returns
/// Delay in milliseconds
pub fn calculate_retry_delay(attempt: u32, max_delay_ms: u64) -> u64 {
    if attempt == 0 {
        return 0;
    }

    let shift = attempt.saturating_sub(1).min(30); // Prevent overflow of u64 shift
    let base_delay = 100u64.saturating_mul(1 << shift);

    base_delay.min(max_delay_ms)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        // Attempt 1: 100ms * 2^0 = 100
        assert_eq!(calculate_retry_delay(1, u64::MAX), 100);

        // Attempt 2: 100ms * 2^1 = 200
        assert_eq!(calculate_retry_delay(2, u64::MAX), 200);

        // Attempt 3: 100ms * 2^2 = 400
        assert_eq!(calculate_retry_delay(3, u64::MAX), 400);

        // Attempt 10: 100ms * 2^9 = 51200
        assert_eq!(calculate_retry_delay(10, u64::MAX), 51200);
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(calculate_retry_delay(6, 5000), 3200);
        assert_eq!(calculate_retry_delay(7, 5000), 5000);
        assert_eq!(calculate_retry_delay(20, 5000), 5000);
    }

    #[test]
    fn test_attempt_zero_has_no_delay() {
        assert_eq!(calculate_retry_delay(0, 5000), 0);
    }

    #[test]
    fn test_safety_overflow() {
        // Should not panic on high numbers
        let delay = calculate_retry_delay(100, u64::MAX);
        assert!(delay > 0);
    }
}
