use proptest::prelude::*;
use reservecraft::targets::{compute_targets, TargetType, Targets};
use reservecraft::ReserveError;

mod proptest_helpers;

fn arb_totals() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0u32..=1000).prop_map(|v| f64::from(v) / 8.0), 1..=10)
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn relative_targets_are_proportions_of_totals(
        totals in arb_totals(),
        proportion in 0.0f64..=1.0
    ) {
        let targets = compute_targets(&totals, &Targets::Scalar(proportion), TargetType::Relative)
            .expect("relative targets");

        prop_assert_eq!(targets.len(), totals.len());
        for (target, total) in targets.iter().zip(&totals) {
            prop_assert_eq!(*target, proportion * total);
            prop_assert!(*target <= *total);
        }
    }

    #[test]
    fn absolute_target_equal_to_total_is_feasible(totals in arb_totals()) {
        let targets = compute_targets(
            &totals,
            &Targets::PerFeature(totals.clone()),
            TargetType::Absolute,
        )
        .expect("absolute targets");
        prop_assert_eq!(targets, totals);
    }

    #[test]
    fn absolute_target_above_total_is_infeasible(
        (totals, feature) in arb_totals().prop_flat_map(|totals| {
            let n = totals.len();
            (Just(totals), 0..n)
        })
    ) {
        let mut requested = totals.clone();
        requested[feature] += 0.5;

        let err = compute_targets(&totals, &Targets::PerFeature(requested), TargetType::Absolute)
            .unwrap_err();
        match err {
            ReserveError::InfeasibleTarget { feature: id, .. } => {
                prop_assert_eq!(id.get(), feature + 1);
            }
            other => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
