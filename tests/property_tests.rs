use calsat::cmp::Operator;
use calsat::config::Config;
use calsat::consistency::{filter, node_consistency, PropagationLevel};
use calsat::constraint::DateConstraint;
use calsat::domain::{initialize, DomainState};
use calsat::solve;
use calsat::solver::Solver;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn day(d: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 3, 1).unwrap() + Days::new(d)
}

const RANGE_START: u64 = 1;

fn op_strategy() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::ALL.to_vec())
}

/// (meetings, last day offset, constraints); unary dates may fall outside the range.
fn problem() -> impl Strategy<Value = (usize, u64, Vec<DateConstraint>)> {
    (1usize..=4, 0u64..6).prop_flat_map(|(n, span)| {
        let constraint = prop_oneof![
            (op_strategy(), 0..n, 0u64..9)
                .prop_map(|(op, l, d)| DateConstraint::unary(op, l, day(d))),
            (op_strategy(), 0..n, 0..n).prop_map(|(op, l, r)| DateConstraint::binary(op, l, r)),
        ];
        (
            Just(n),
            Just(RANGE_START + span),
            prop::collection::vec(constraint, 0..7),
        )
    })
}

fn brute_force(n: usize, last: u64, constraints: &[DateConstraint]) -> Vec<Vec<NaiveDate>> {
    let mut out = Vec::new();
    let mut idx = vec![RANGE_START; n];
    loop {
        let a = idx.iter().map(|&i| day(i)).collect::<Vec<_>>();
        if constraints.iter().all(|c| c.satisfied(&a)) {
            out.push(a);
        }
        let mut k = 0;
        loop {
            if k == n {
                return out;
            }
            idx[k] += 1;
            if idx[k] <= last {
                break;
            }
            idx[k] = RANGE_START;
            k += 1;
        }
    }
}

proptest! {
    #[test]
    fn solve_agrees_with_brute_force((n, last, constraints) in problem()) {
        let expected = brute_force(n, last, &constraints);
        let result = solve(n, day(RANGE_START), day(last), &constraints).unwrap();
        match result {
            Some(assignment) => {
                prop_assert_eq!(assignment.len(), n);
                prop_assert!(expected.contains(&assignment));
            }
            None => prop_assert!(expected.is_empty()),
        }
    }

    #[test]
    fn enumeration_is_exact((n, last, constraints) in problem()) {
        let expected = brute_force(n, last, &constraints);
        for level in [PropagationLevel::SinglePass, PropagationLevel::FixedPoint] {
            let mut solver = Solver::new(n, day(RANGE_START), day(last)).unwrap();
            for &c in &constraints {
                solver.add_constraint(c).unwrap();
            }
            let config = Config { propagation: level, ..Config::default() };
            let mut found = solver.solutions(config);
            found.sort();
            let mut want = expected.clone();
            want.sort();
            prop_assert_eq!(found, want);
        }
    }

    #[test]
    fn filtering_keeps_every_solution_value((n, last, constraints) in problem()) {
        let solutions = brute_force(n, last, &constraints);
        for level in [PropagationLevel::SinglePass, PropagationLevel::FixedPoint] {
            let mut domains = initialize(n, day(RANGE_START), day(last)).unwrap();
            let consistent = filter(&mut domains, &constraints, level);
            if !consistent {
                prop_assert!(solutions.is_empty());
            }
            for s in &solutions {
                for (v, date) in s.iter().enumerate() {
                    prop_assert!(domains[v].contains(*date));
                }
            }
        }
    }

    #[test]
    fn node_consistency_is_idempotent((n, last, constraints) in problem()) {
        let mut domains = initialize(n, day(RANGE_START), day(last)).unwrap();
        node_consistency(&mut domains, &constraints);
        let before = domains.clone();
        prop_assert_eq!(node_consistency(&mut domains, &constraints), DomainState::Same);
        prop_assert_eq!(domains, before);
    }

    #[test]
    fn initial_domains_cover_range(n in 1usize..5, first in 0u64..40, span in 0u64..200) {
        let domains = initialize(n, day(first), day(first + span)).unwrap();
        prop_assert_eq!(domains.len(), n);
        for d in &domains {
            prop_assert_eq!(d.size(), span + 1);
            prop_assert_eq!(d.iter().count() as u64, span + 1);
            prop_assert_eq!(d.min(), Some(day(first)));
            prop_assert_eq!(d.max(), Some(day(first + span)));
        }
    }
}
