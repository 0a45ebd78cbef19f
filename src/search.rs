use crate::config::Config;
use crate::constraint::DateConstraint;
use crate::domain::Domain;
use crate::value_selector::ValueSelector;
use chrono::NaiveDate;
use std::time::Instant;

/// The clock is read once every 1024 search nodes.
const CLOCK_CHECK_MASK: u64 = 0x3FF;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of tentative assignments made.
    pub nodes: u64,
    /// Complete assignments checked against the constraints.
    pub leaves: u64,
    /// Complete assignments rejected by the check.
    pub fails: u64,
    pub max_depth: usize,
    pub solutions: u64,
    pub whole_tree_explored: bool,
    pub timed_out: bool,
}

struct SearchNode {
    candidates: Vec<NaiveDate>,
    next: usize,
}

/// Depth-first search over the filtered domains, assigning meetings in
/// index order. Complete assignments are checked against every constraint;
/// each valid one is yielded by the iterator.
pub struct Search<'a> {
    constraints: &'a [DateConstraint],
    domains: &'a [Domain],
    value_selector: Box<dyn ValueSelector>,
    all_solutions: bool,
    deadline: Option<Instant>,
    assignment: Vec<NaiveDate>,
    stack: Vec<SearchNode>,
    started: bool,
    done: bool,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    /// `domains` must be non-empty and every constraint must reference
    /// meetings below `domains.len()`.
    pub fn new(config: Config, constraints: &'a [DateConstraint], domains: &'a [Domain]) -> Self {
        Self {
            constraints,
            domains,
            value_selector: config.value_selector,
            all_solutions: config.all_solutions,
            deadline: config.time_limit.map(|limit| Instant::now() + limit),
            assignment: Vec::with_capacity(domains.len()),
            stack: Vec::with_capacity(domains.len()),
            started: false,
            done: false,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn check_solution(&self, assignment: &[NaiveDate]) -> bool {
        self.constraints.iter().all(|c| c.satisfied(assignment))
    }

    fn push_node(&mut self, meeting: usize) {
        let candidates = self.value_selector.candidates(&self.domains[meeting]);
        self.stack.push(SearchNode {
            candidates,
            next: 0,
        });
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
    }

    fn out_of_time(&self) -> bool {
        match self.deadline {
            Some(deadline) => {
                self.stats.nodes & CLOCK_CHECK_MASK == 0 && Instant::now() >= deadline
            }
            None => false,
        }
    }
}

impl Iterator for Search<'_> {
    type Item = Vec<NaiveDate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let n = self.domains.len();
        if !self.started {
            self.started = true;
            self.push_node(0);
        } else if self.assignment.len() == n {
            // resuming after a reported solution
            self.assignment.pop();
        }
        loop {
            if self.out_of_time() {
                tracing::debug!(nodes = self.stats.nodes, "search aborted: time limit reached");
                self.stats.timed_out = true;
                self.done = true;
                return None;
            }
            let Some(node) = self.stack.last_mut() else {
                tracing::debug!(
                    nodes = self.stats.nodes,
                    solutions = self.stats.solutions,
                    "search tree exhausted"
                );
                self.stats.whole_tree_explored = true;
                self.done = true;
                return None;
            };
            if node.next == node.candidates.len() {
                self.stack.pop();
                self.assignment.pop();
                continue;
            }
            let date = node.candidates[node.next];
            node.next += 1;
            self.assignment.push(date);
            self.stats.nodes += 1;
            tracing::trace!(meeting = self.assignment.len() - 1, %date, "branch");
            if self.assignment.len() < n {
                self.push_node(self.assignment.len());
                continue;
            }
            self.stats.leaves += 1;
            if self.check_solution(&self.assignment) {
                self.stats.solutions += 1;
                if !self.all_solutions {
                    self.done = true;
                }
                return Some(self.assignment.clone());
            }
            self.stats.fails += 1;
            self.assignment.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmp::Operator;
    use crate::domain::initialize;
    use crate::value_selector::MaxValueSelector;
    use chrono::Days;

    fn day(d: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap() + Days::new(d)
    }

    #[test]
    fn test_first_solution_in_lex_order() {
        let domains = initialize(2, day(0), day(2)).unwrap();
        let constraints = [DateConstraint::binary(Operator::Less, 0, 1)];
        let mut search = Search::new(Config::default(), &constraints, &domains);
        assert_eq!(search.next(), Some(vec![day(0), day(1)]));
        assert_eq!(search.next(), None);
        assert!(!search.stats().whole_tree_explored);
        assert_eq!(search.stats().solutions, 1);
    }

    #[test]
    fn test_enumerates_all_solutions() {
        let domains = initialize(2, day(0), day(2)).unwrap();
        let constraints = [DateConstraint::binary(Operator::Less, 0, 1)];
        let config = Config {
            all_solutions: true,
            ..Config::default()
        };
        let mut search = Search::new(config, &constraints, &domains);
        let all = search.by_ref().collect::<Vec<_>>();
        assert_eq!(
            all,
            vec![
                vec![day(0), day(1)],
                vec![day(0), day(2)],
                vec![day(1), day(2)]
            ]
        );
        let stats = search.stats();
        assert!(stats.whole_tree_explored);
        assert_eq!(stats.leaves, 9);
        assert_eq!(stats.fails, 6);
        assert_eq!(stats.nodes, 12);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn test_latest_first() {
        let domains = initialize(2, day(0), day(2)).unwrap();
        let constraints = [DateConstraint::binary(Operator::Less, 0, 1)];
        let config = Config {
            value_selector: Box::new(MaxValueSelector {}),
            ..Config::default()
        };
        let mut search = Search::new(config, &constraints, &domains);
        assert_eq!(search.next(), Some(vec![day(1), day(2)]));
    }

    #[test]
    fn test_exhaustion() {
        let domains = initialize(2, day(0), day(1)).unwrap();
        let constraints = [
            DateConstraint::binary(Operator::Equal, 0, 1),
            DateConstraint::binary(Operator::NotEqual, 0, 1),
        ];
        let mut search = Search::new(Config::default(), &constraints, &domains);
        assert_eq!(search.next(), None);
        assert!(search.stats().whole_tree_explored);
        assert_eq!(search.stats().solutions, 0);
        assert_eq!(search.next(), None);
    }
}
