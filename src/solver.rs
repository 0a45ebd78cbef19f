use crate::config::Config;
use crate::consistency::{filter, PropagationLevel};
use crate::constraint::DateConstraint;
use crate::domain::{initialize, Domain};
use crate::error::Error;
use crate::search::Search;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsatReason {
    /// Some domain was emptied by node or arc consistency.
    Filtering,
    /// Search explored every branch without a valid assignment.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfied(Vec<NaiveDate>),
    Unsatisfiable(UnsatReason),
    /// The time limit expired before the search finished.
    Unknown,
}

impl SolveOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, SolveOutcome::Satisfied(_))
    }

    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Unsatisfiable(_))
    }

    pub fn into_assignment(self) -> Option<Vec<NaiveDate>> {
        match self {
            SolveOutcome::Satisfied(assignment) => Some(assignment),
            _ => None,
        }
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Satisfied(assignment) => {
                write!(f, "Satisfied([")?;
                for (i, date) in assignment.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", date)?;
                }
                write!(f, "])")
            }
            SolveOutcome::Unsatisfiable(UnsatReason::Filtering) => {
                write!(f, "Unsatisfiable(filtering)")
            }
            SolveOutcome::Unsatisfiable(UnsatReason::Search) => write!(f, "Unsatisfiable(search)"),
            SolveOutcome::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Owns one scheduling problem: the Domain Store and the constraint set.
pub struct Solver {
    constraints: Vec<DateConstraint>,
    domains: Vec<Domain>,
}

impl Solver {
    pub fn new(
        n_meetings: usize,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Self, Error> {
        if n_meetings == 0 {
            return Err(Error::NoMeetings);
        }
        Ok(Self {
            constraints: Vec::new(),
            domains: initialize(n_meetings, range_start, range_end)?,
        })
    }

    pub fn add_constraint(&mut self, c: DateConstraint) -> Result<(), Error> {
        c.check(self.domains.len())?;
        self.constraints.push(c);
        Ok(())
    }

    pub fn n_meetings(&self) -> usize {
        self.domains.len()
    }

    pub fn constraints(&self) -> &[DateConstraint] {
        &self.constraints
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Prunes the domains in place; false means the problem is unsatisfiable.
    pub fn propagate(&mut self, level: PropagationLevel) -> bool {
        filter(&mut self.domains, &self.constraints, level)
    }

    /// Filters the domains and starts a search over them.
    /// Returns None if filtering already proves there is no solution.
    pub fn search(&mut self, config: Config) -> Option<Search<'_>> {
        if !self.propagate(config.propagation) {
            return None;
        }
        Some(Search::new(config, &self.constraints, &self.domains))
    }

    pub fn solve_with(&mut self, config: Config) -> SolveOutcome {
        let Some(mut search) = self.search(config) else {
            return SolveOutcome::Unsatisfiable(UnsatReason::Filtering);
        };
        match search.next() {
            Some(assignment) => SolveOutcome::Satisfied(assignment),
            None if search.stats().whole_tree_explored => {
                SolveOutcome::Unsatisfiable(UnsatReason::Search)
            }
            None => SolveOutcome::Unknown,
        }
    }

    /// Every valid assignment, in search order.
    pub fn solutions(&mut self, config: Config) -> Vec<Vec<NaiveDate>> {
        let config = Config {
            all_solutions: true,
            ..config
        };
        match self.search(config) {
            Some(search) => search.collect(),
            None => Vec::new(),
        }
    }
}

/// Schedules `n_meetings` meetings within `[range_start, range_end]` so that
/// every constraint holds. `Ok(None)` means no such schedule exists.
pub fn solve(
    n_meetings: usize,
    range_start: NaiveDate,
    range_end: NaiveDate,
    constraints: &[DateConstraint],
) -> Result<Option<Vec<NaiveDate>>, Error> {
    let mut solver = Solver::new(n_meetings, range_start, range_end)?;
    for &c in constraints {
        solver.add_constraint(c)?;
    }
    let outcome = solver.solve_with(Config::default());
    tracing::debug!(%outcome, "solve finished");
    Ok(outcome.into_assignment())
}
