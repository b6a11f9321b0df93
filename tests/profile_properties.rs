// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Speed Trap Enforcement Simulator - Property Tests

use proptest::prelude::*;
use speed_trap::{CopPool, OffenseProfile, TrafficPattern};

fn profile_strategy() -> impl Strategy<Value = OffenseProfile> {
    (1.0f64..60.0, 0.5f64..120.0, 10.0f64..1_000.0)
        .prop_map(|(sev, gap, fine)| OffenseProfile::new(sev, gap, fine).unwrap())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn combine_is_commutative(a in profile_strategy(), b in profile_strategy()) {
        let ab = a.combine(&b);
        let ba = b.combine(&a);
        prop_assert!(close(ab.arrival_rate_per_min(), ba.arrival_rate_per_min()));
        prop_assert!(close(ab.severity(), ba.severity()));
        prop_assert!(close(ab.fine_amount(), ba.fine_amount()));
        prop_assert!(close(ab.revenue_opportunity_per_hour(), ba.revenue_opportunity_per_hour()));
    }

    #[test]
    fn combine_is_associative(
        a in profile_strategy(),
        b in profile_strategy(),
        c in profile_strategy(),
    ) {
        let left = a.combine(&b).combine(&c);
        let right = a.combine(&b.combine(&c));
        prop_assert!(close(left.arrival_rate_per_min(), right.arrival_rate_per_min()));
        prop_assert!(close(left.severity(), right.severity()));
        prop_assert!(close(left.fine_amount(), right.fine_amount()));
        prop_assert!(close(left.revenue_opportunity_per_hour(), right.revenue_opportunity_per_hour()));
    }

    #[test]
    fn null_profile_is_identity(a in profile_strategy()) {
        let merged = a.combine(&OffenseProfile::null());
        prop_assert!(close(merged.arrival_rate_per_min(), a.arrival_rate_per_min()));
        prop_assert!(close(merged.severity(), a.severity()));
        prop_assert!(close(merged.mean_gap_minutes(), a.mean_gap_minutes()));
    }

    #[test]
    fn combined_severity_stays_within_inputs(a in profile_strategy(), b in profile_strategy()) {
        let ab = a.combine(&b);
        let lo = a.severity().min(b.severity());
        let hi = a.severity().max(b.severity());
        prop_assert!(ab.severity() >= lo - 1e-9 && ab.severity() <= hi + 1e-9);
    }

    #[test]
    fn pattern_sorted_and_weights_sum_to_one(
        profiles in prop::collection::vec(profile_strategy(), 1..8),
    ) {
        let pattern = TrafficPattern::new(profiles).unwrap();
        prop_assert!(pattern.profiles().windows(2).all(|w| w[0].severity() >= w[1].severity()));
        let total: f64 = pattern.weights().iter().sum();
        prop_assert!(close(total, 1.0));
    }

    #[test]
    fn pool_never_goes_negative(
        cops in 1usize..6,
        steps in prop::collection::vec((0.0f64..30.0, any::<bool>()), 1..50),
    ) {
        let mut pool = CopPool::new(cops, 15.0, 300.0).unwrap();
        for (dt, ticket) in steps {
            pool.elapse(dt).unwrap();
            if ticket && pool.is_front_available() {
                pool.issue_ticket(None).unwrap();
            }
            prop_assert_eq!(pool.len(), cops);
            prop_assert!(pool.cops().all(|c| (0.0..=15.0).contains(&c.minutes_until_available)));
        }
    }
}
