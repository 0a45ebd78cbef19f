use crate::cmp::Operator;
use crate::constraint::{DateConstraint, Operand};
use crate::domain::{Domain, DomainState};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationLevel {
    /// Every binary constraint is revised exactly once, left side first.
    #[default]
    SinglePass,
    /// Arcs are re-revised until no domain changes (AC-3).
    FixedPoint,
}

fn merge(a: DomainState, b: DomainState) -> DomainState {
    if a == DomainState::Modified || b == DomainState::Modified {
        DomainState::Modified
    } else {
        DomainState::Same
    }
}

fn pair_mut(domains: &mut [Domain], x: usize, y: usize) -> (&mut Domain, &mut Domain) {
    if x < y {
        let (lo, hi) = domains.split_at_mut(y);
        (&mut lo[x], &mut hi[0])
    } else {
        let (lo, hi) = domains.split_at_mut(x);
        (&mut hi[0], &mut lo[y])
    }
}

/// Prunes single domains with the unary constraints.
pub fn node_consistency(domains: &mut [Domain], constraints: &[DateConstraint]) -> DomainState {
    let mut state = DomainState::Same;
    for c in constraints {
        if let Operand::Date(r) = c.right {
            let dom = &mut domains[c.left];
            let s = match c.op {
                Operator::Equal => dom.assign(r),
                Operator::NotEqual => dom.remove(r),
                op => dom.retain(|d| op.holds(&d, &r)),
            };
            state = merge(state, s);
        }
    }
    state
}

/// Removes from `x` every date `d` for which no `p` in `y` satisfies `d OP p`.
pub fn revise(x: &mut Domain, op: Operator, y: &Domain) -> DomainState {
    let (Some(lo), Some(hi)) = (y.min(), y.max()) else {
        return x.clear();
    };
    match op {
        Operator::Equal => x.retain(|d| y.contains(d)),
        Operator::NotEqual if lo == hi => x.remove(lo),
        Operator::NotEqual => DomainState::Same,
        Operator::Greater => x.retain(|d| d > lo),
        Operator::GreaterEqual => x.retain(|d| d >= lo),
        Operator::Less => x.retain(|d| d < hi),
        Operator::LessEqual => x.retain(|d| d <= hi),
    }
}

/// A meeting related to itself: the only partner of `d` is `d`.
fn revise_self(x: &mut Domain, op: Operator) -> DomainState {
    x.retain(|d| op.holds(&d, &d))
}

/// Revises the left domain against the right one, then the right domain
/// against what is left of the left one.
fn revise_both(domains: &mut [Domain], left: usize, op: Operator, right: usize) -> DomainState {
    if left == right {
        return revise_self(&mut domains[left], op);
    }
    let (x, y) = pair_mut(domains, left, right);
    let a = revise(x, op, y);
    let b = revise(y, op.flip(), x);
    merge(a, b)
}

/// Applies every binary constraint once, in input order.
pub fn arc_consistency(domains: &mut [Domain], constraints: &[DateConstraint]) -> DomainState {
    let mut state = DomainState::Same;
    for c in constraints {
        if let Operand::Meeting(r) = c.right {
            state = merge(state, revise_both(domains, c.left, c.op, r));
        }
    }
    state
}

struct Arc {
    constraint: usize,
    x: usize,
    op: Operator,
    y: usize,
}

/// AC-3: whenever revising `x` against `y` shrinks `x`, every arc
/// `(z, x)` is queued again, except the reverse arc of the same constraint.
pub fn arc_consistency_fixed_point(
    domains: &mut [Domain],
    constraints: &[DateConstraint],
) -> DomainState {
    let mut state = DomainState::Same;
    let mut arcs = Vec::new();
    for (id, c) in constraints.iter().enumerate() {
        if let Operand::Meeting(r) = c.right {
            if c.left == r {
                state = merge(state, revise_self(&mut domains[r], c.op));
            } else {
                arcs.push(Arc {
                    constraint: id,
                    x: c.left,
                    op: c.op,
                    y: r,
                });
                arcs.push(Arc {
                    constraint: id,
                    x: r,
                    op: c.op.flip(),
                    y: c.left,
                });
            }
        }
    }
    let mut arcs_towards = vec![Vec::new(); domains.len()];
    for (i, arc) in arcs.iter().enumerate() {
        arcs_towards[arc.y].push(i);
    }
    let mut queue = (0..arcs.len()).collect::<VecDeque<_>>();
    let mut queued = vec![true; arcs.len()];
    while let Some(i) = queue.pop_front() {
        queued[i] = false;
        let arc = &arcs[i];
        let (x, y) = pair_mut(domains, arc.x, arc.y);
        if revise(x, arc.op, y) == DomainState::Same {
            continue;
        }
        state = DomainState::Modified;
        if x.is_empty() {
            break;
        }
        for &j in &arcs_towards[arc.x] {
            let reverse = arcs[j].constraint == arc.constraint && arcs[j].x == arc.y;
            if !reverse && !queued[j] {
                queued[j] = true;
                queue.push_back(j);
            }
        }
    }
    state
}

/// Runs node consistency then arc consistency at the given level.
/// Returns false when some domain ended up empty.
pub fn filter(
    domains: &mut [Domain],
    constraints: &[DateConstraint],
    level: PropagationLevel,
) -> bool {
    node_consistency(domains, constraints);
    tracing::debug!(
        sizes = ?domains.iter().map(Domain::size).collect::<Vec<_>>(),
        "node consistency done"
    );
    match level {
        PropagationLevel::SinglePass => arc_consistency(domains, constraints),
        PropagationLevel::FixedPoint => arc_consistency_fixed_point(domains, constraints),
    };
    tracing::debug!(
        sizes = ?domains.iter().map(Domain::size).collect::<Vec<_>>(),
        ?level,
        "arc consistency done"
    );
    match domains.iter().position(Domain::is_empty) {
        Some(meeting) => {
            tracing::debug!(meeting, "domain wiped out by filtering");
            false
        }
        None => true,
    }
}
