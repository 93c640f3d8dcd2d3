//! Three-way revenue split over integer minor units.
//!
//! This is the only place percentage math happens. Each component is
//! rounded half-up to the minor unit; the signed rounding residual is
//! folded into the platform amount so the three components always sum
//! exactly to the total.

use crate::error::CoreError;
use crate::request::FeePercents;
use crate::types::MinorUnits;

/// The result of splitting a purchase price among the platform, the data
/// subject, and the reference author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RevenueSplit {
    pub platform: MinorUnits,
    pub user: MinorUnits,
    pub ref_creator: MinorUnits,
}

impl RevenueSplit {
    pub fn total(self) -> MinorUnits {
        self.platform + self.user + self.ref_creator
    }
}

/// `round(amount * percent / 100)`, half-up, in minor units.
fn component(amount: MinorUnits, percent: i32) -> MinorUnits {
    (amount * percent as i64 + 50) / 100
}

/// Split `total` according to `percents`.
///
/// Postcondition: `platform + user + ref_creator == total` exactly, for
/// every non-negative total and every percentage triple summing to 100.
pub fn split(total: MinorUnits, percents: FeePercents) -> Result<RevenueSplit, CoreError> {
    if total < 0 {
        return Err(CoreError::Validation(format!(
            "split total must be non-negative, got {total}"
        )));
    }
    percents.validate()?;

    let user = component(total, percents.user_fee_percent);
    let ref_creator = component(total, percents.ref_creator_fee_percent);
    let platform = component(total, percents.platform_fee_percent);

    // Fold the rounding residual into the platform amount.
    let residual = total - (platform + user + ref_creator);
    Ok(RevenueSplit {
        platform: platform + residual,
        user,
        ref_creator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn percents(platform: i32, user: i32, ref_creator: i32) -> FeePercents {
        FeePercents {
            platform_fee_percent: platform,
            user_fee_percent: user,
            ref_creator_fee_percent: ref_creator,
        }
    }

    #[test]
    fn hundred_dollars_40_40_20() {
        let s = split(10_000, percents(40, 40, 20)).unwrap();
        assert_eq!(s.platform, 4_000);
        assert_eq!(s.user, 4_000);
        assert_eq!(s.ref_creator, 2_000);
        assert_eq!(s.total(), 10_000);
    }

    #[test]
    fn one_cent_40_40_20_sums_exactly() {
        // 0.4 + 0.4 + 0.2 cents all round, residual goes to platform.
        let s = split(1, percents(40, 40, 20)).unwrap();
        assert_eq!(s.total(), 1);
        assert_eq!(s.user, 0);
        assert_eq!(s.ref_creator, 0);
        assert_eq!(s.platform, 1);
    }

    #[test]
    fn residual_can_be_negative() {
        // 3 cents at 50/50/0: user rounds 1.5 up to 2, platform must absorb
        // the overshoot to keep the sum exact.
        let s = split(3, percents(50, 50, 0)).unwrap();
        assert_eq!(s.total(), 3);
        assert_eq!(s.user, 2);
        assert_eq!(s.ref_creator, 0);
        assert_eq!(s.platform, 1);
    }

    #[test]
    fn zero_total_splits_to_zero() {
        let s = split(0, percents(40, 40, 20)).unwrap();
        assert_eq!(s.platform, 0);
        assert_eq!(s.user, 0);
        assert_eq!(s.ref_creator, 0);
    }

    #[test]
    fn exhaustive_small_totals_sum_exactly() {
        // Every total up to $10 against a few awkward percentage triples.
        for (p, u, r) in [(40, 40, 20), (33, 33, 34), (1, 98, 1), (100, 0, 0), (0, 0, 100)] {
            let percents = percents(p, u, r);
            for total in 0..=1_000 {
                let s = split(total, percents).unwrap();
                assert_eq!(s.total(), total, "total={total} split={p}/{u}/{r}");
                assert!(s.user >= 0 && s.ref_creator >= 0, "total={total}");
            }
        }
    }

    #[test]
    fn negative_total_is_rejected() {
        assert_matches!(
            split(-1, percents(40, 40, 20)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn percents_not_summing_to_100_are_rejected() {
        assert_matches!(split(100, percents(40, 40, 30)), Err(CoreError::Validation(_)));
    }
}
