use chrono::{DateTime, Utc};

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Collapse the AVG() of a professor's review ratings into the stored
/// rating: one decimal place, 0.0 when no reviews remain.
pub fn rating_from_mean(mean: Option<f64>) -> f64 {
    match mean {
        Some(mean) => (mean * 10.0).round() / 10.0,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::rating_from_mean;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(rating_from_mean(Some(11.0 / 3.0)), 3.7);
        assert_eq!(rating_from_mean(Some(4.5)), 4.5);
        assert_eq!(rating_from_mean(Some(4.0)), 4.0);
    }

    #[test]
    fn empty_review_set_is_zero() {
        assert_eq!(rating_from_mean(None), 0.0);
    }
}
