//! Unit tests for the leaf collaborators.

#[cfg(test)]
mod demand {
    use meio_core::{Period, SimRng};

    use crate::DemandSource;

    #[test]
    fn constant_always_same() {
        let mut rng = SimRng::new(1);
        let src = DemandSource::constant(5.0).unwrap();
        for t in 0..20 {
            assert_eq!(src.generate(Period(t), &mut rng), Some(5.0));
        }
    }

    #[test]
    fn deterministic_cycles() {
        let mut rng = SimRng::new(1);
        let src = DemandSource::deterministic(vec![0.0, 10.0]).unwrap();
        assert_eq!(src.generate(Period(0), &mut rng), Some(0.0));
        assert_eq!(src.generate(Period(1), &mut rng), Some(10.0));
        assert_eq!(src.generate(Period(2), &mut rng), Some(0.0));
        assert_eq!(src.generate(Period(7), &mut rng), Some(10.0));
    }

    #[test]
    fn normal_truncated_at_zero() {
        // Mean 0 with wide spread: roughly half the raw draws are negative,
        // all realized values must still be >= 0.
        let mut rng = SimRng::new(7);
        let src = DemandSource::normal(0.0, 10.0).unwrap();
        for t in 0..1000 {
            let v = src.generate(Period(t), &mut rng).unwrap();
            assert!(v >= 0.0, "negative demand {v}");
        }
    }

    #[test]
    fn normal_mean_approximately_recovered() {
        let mut rng = SimRng::new(11);
        let src = DemandSource::normal(50.0, 2.0).unwrap();
        let n = 5000;
        let sum: f64 = (0..n)
            .map(|t| src.generate(Period(t), &mut rng).unwrap())
            .sum();
        let mean = sum / n as f64;
        assert!((mean - 50.0).abs() < 0.5, "sample mean {mean}");
    }

    #[test]
    fn uniform_discrete_in_bounds_and_integer() {
        let mut rng = SimRng::new(3);
        let src = DemandSource::uniform_discrete(2, 6).unwrap();
        for t in 0..500 {
            let v = src.generate(Period(t), &mut rng).unwrap();
            assert!((2.0..=6.0).contains(&v));
            assert_eq!(v, v.trunc());
        }
    }

    #[test]
    fn draws_are_deterministic_per_seed() {
        let src = DemandSource::poisson(4.0).unwrap();
        let draw = |seed: u64| -> Vec<f64> {
            let mut rng = SimRng::new(seed);
            (0..50).map(|t| src.generate(Period(t), &mut rng).unwrap()).collect()
        };
        assert_eq!(draw(42), draw(42));
        assert_ne!(draw(42), draw(43));
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(DemandSource::constant(-1.0).is_err());
        assert!(DemandSource::normal(5.0, -1.0).is_err());
        assert!(DemandSource::uniform_discrete(6, 2).is_err());
        assert!(DemandSource::uniform_continuous(3.0, 1.0).is_err());
        assert!(DemandSource::deterministic(vec![]).is_err());
        assert!(DemandSource::deterministic(vec![1.0, -2.0]).is_err());
    }

    #[test]
    fn mean_closed_forms() {
        assert_eq!(DemandSource::constant(5.0).unwrap().mean(), 5.0);
        assert_eq!(DemandSource::uniform_discrete(2, 6).unwrap().mean(), 4.0);
        assert_eq!(DemandSource::poisson(3.5).unwrap().mean(), 3.5);
        assert_eq!(DemandSource::deterministic(vec![0.0, 10.0]).unwrap().mean(), 5.0);
    }
}

#[cfg(test)]
mod disruption {
    use meio_core::SimRng;

    use crate::{DisruptionKind, DisruptionProcess, DisruptionState};

    #[test]
    fn starts_up_unless_preset() {
        let p = DisruptionProcess::markov(DisruptionKind::OrderPausing, 0.1, 0.5).unwrap();
        assert!(!p.is_disrupted());
        let p = p.starting_from(DisruptionState::Down);
        assert!(p.is_disrupted());
    }

    #[test]
    fn explicit_pattern_followed_and_cycled() {
        let mut rng = SimRng::new(0);
        let mut p = DisruptionProcess::explicit(
            DisruptionKind::ShipmentPausing,
            vec![false, true, true],
        )
        .unwrap();
        let mut seen = Vec::new();
        for _ in 0..6 {
            p.step(&mut rng);
            seen.push(p.is_disrupted());
        }
        assert_eq!(seen, vec![false, true, true, false, true, true]);
    }

    #[test]
    fn markov_long_run_matches_availability() {
        // Down-fraction over a long horizon should converge to
        // alpha / (alpha + beta).
        let (alpha, beta) = (0.05, 0.3);
        let mut p = DisruptionProcess::markov(DisruptionKind::TransitPausing, alpha, beta).unwrap();
        let mut rng = SimRng::new(99);
        let horizon = 100_000;
        let mut down = 0usize;
        for _ in 0..horizon {
            p.step(&mut rng);
            if p.is_disrupted() {
                down += 1;
            }
        }
        let down_fraction = down as f64 / horizon as f64;
        let expected = alpha / (alpha + beta);
        assert!(
            (down_fraction - expected).abs() < 0.01,
            "down fraction {down_fraction}, expected {expected}"
        );
        assert!((p.availability().unwrap() - beta / (alpha + beta)).abs() < 1e-12);
    }

    #[test]
    fn extreme_probabilities() {
        let mut rng = SimRng::new(5);
        let mut never = DisruptionProcess::markov(DisruptionKind::ReceiptPausing, 0.0, 1.0).unwrap();
        for _ in 0..100 {
            never.step(&mut rng);
            assert!(!never.is_disrupted());
        }
        let mut flip = DisruptionProcess::markov(DisruptionKind::ReceiptPausing, 1.0, 1.0).unwrap();
        flip.step(&mut rng);
        assert!(flip.is_disrupted());
        flip.step(&mut rng);
        assert!(!flip.is_disrupted());
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(DisruptionProcess::markov(DisruptionKind::OrderPausing, -0.1, 0.5).is_err());
        assert!(DisruptionProcess::markov(DisruptionKind::OrderPausing, 0.1, 1.5).is_err());
        assert!(DisruptionProcess::explicit(DisruptionKind::OrderPausing, vec![]).is_err());
    }
}

#[cfg(test)]
mod policy {
    use crate::InventoryPolicy;

    #[test]
    fn orders_up_to_target() {
        let p = InventoryPolicy::local_base_stock(10.0);
        assert_eq!(p.order_quantity(4.0, None, None), 6.0);
        assert_eq!(p.order_quantity(10.0, None, None), 0.0);
        // Above target: never a negative order.
        assert_eq!(p.order_quantity(15.0, None, None), 0.0);
    }

    #[test]
    fn capacity_caps_quantity() {
        let p = InventoryPolicy::echelon_base_stock(20.0);
        assert_eq!(p.order_quantity(5.0, None, Some(8.0)), 8.0);
        assert_eq!(p.order_quantity(5.0, None, Some(100.0)), 15.0);
    }

    #[test]
    fn balanced_respects_downstream_adjusted_position() {
        let p = InventoryPolicy::balanced_echelon_base_stock(20.0);
        // Unconstrained order would be 12; downstream adjusted position
        // only supports raising the position to 14.
        assert_eq!(p.order_quantity(8.0, Some(14.0), None), 6.0);
        // Downstream already behind this node's position: order nothing.
        assert_eq!(p.order_quantity(8.0, Some(5.0), None), 0.0);
        // Downstream unconstrained: plain base-stock order.
        assert_eq!(p.order_quantity(8.0, Some(1000.0), None), 12.0);
    }

    #[test]
    fn variant_observation_requirements() {
        assert!(!InventoryPolicy::local_base_stock(1.0).uses_echelon_position());
        assert!(InventoryPolicy::echelon_base_stock(1.0).uses_echelon_position());
        assert!(InventoryPolicy::balanced_echelon_base_stock(1.0).needs_adjusted_position());
    }
}
