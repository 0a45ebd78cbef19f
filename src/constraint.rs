use crate::cmp::Operator;
use crate::error::Error;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Right-hand side of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Fixed calendar date; the constraint is unary.
    Date(NaiveDate),
    /// Another meeting; the constraint is binary.
    Meeting(usize),
}

/// `left OP right`, where `left` is always a meeting index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateConstraint {
    pub op: Operator,
    pub left: usize,
    pub right: Operand,
}

impl DateConstraint {
    pub fn unary(op: Operator, left: usize, date: NaiveDate) -> Self {
        Self {
            op,
            left,
            right: Operand::Date(date),
        }
    }

    pub fn binary(op: Operator, left: usize, right: usize) -> Self {
        Self {
            op,
            left,
            right: Operand::Meeting(right),
        }
    }

    pub fn arity(&self) -> usize {
        match self.right {
            Operand::Date(_) => 1,
            Operand::Meeting(_) => 2,
        }
    }

    /// Checks that every meeting index is below `n_meetings`.
    pub fn check(&self, n_meetings: usize) -> Result<(), Error> {
        let mut indices = vec![self.left];
        if let Operand::Meeting(r) = self.right {
            indices.push(r);
        }
        match indices.into_iter().find(|&i| i >= n_meetings) {
            Some(index) => Err(Error::MeetingOutOfRange { index, n_meetings }),
            None => Ok(()),
        }
    }

    /// Evaluates the constraint against a complete assignment.
    /// The constraint must have passed `check` for `assignment.len()`.
    pub fn satisfied(&self, assignment: &[NaiveDate]) -> bool {
        let lhs = assignment[self.left];
        let rhs = match self.right {
            Operand::Date(date) => date,
            Operand::Meeting(r) => assignment[r],
        };
        self.op.holds(&lhs, &rhs)
    }
}

/// Parses `"<meeting> <op> <meeting|YYYY-MM-DD>"`, e.g. `"0 < 1"` or `"2 != 2019-05-03"`.
impl FromStr for DateConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s.split_whitespace().collect::<Vec<_>>();
        if tokens.len() != 3 {
            return Err(Error::InvalidConstraint(format!(
                "expected 3 tokens in '{}', got {}",
                s,
                tokens.len()
            )));
        }
        let left = tokens[0].parse::<usize>().map_err(|_| {
            Error::InvalidConstraint(format!("'{}' is not a meeting index", tokens[0]))
        })?;
        let op = tokens[1].parse::<Operator>()?;
        if let Ok(right) = tokens[2].parse::<usize>() {
            return Ok(Self::binary(op, left, right));
        }
        let date = NaiveDate::parse_from_str(tokens[2], DATE_FORMAT).map_err(|_| {
            Error::InvalidConstraint(format!(
                "'{}' is neither a meeting index nor a date",
                tokens[2]
            ))
        })?;
        Ok(Self::unary(op, left, date))
    }
}

impl fmt::Display for DateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.right {
            Operand::Date(date) => {
                write!(f, "{} {} {}", self.left, self.op, date.format(DATE_FORMAT))
            }
            Operand::Meeting(r) => write!(f, "{} {} {}", self.left, self.op, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 5, d).unwrap()
    }

    #[test]
    fn test_parse_binary() {
        let c = "0 < 1".parse::<DateConstraint>().unwrap();
        assert_eq!(c, DateConstraint::binary(Operator::Less, 0, 1));
        assert_eq!(c.arity(), 2);
    }

    #[test]
    fn test_parse_unary() {
        let c = "2 != 2019-05-03".parse::<DateConstraint>().unwrap();
        assert_eq!(c, DateConstraint::unary(Operator::NotEqual, 2, day(3)));
        assert_eq!(c.arity(), 1);
        assert_eq!(c.to_string(), "2 != 2019-05-03");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "0 <".parse::<DateConstraint>(),
            Err(Error::InvalidConstraint(_))
        ));
        assert!(matches!(
            "x < 1".parse::<DateConstraint>(),
            Err(Error::InvalidConstraint(_))
        ));
        assert_eq!(
            "0 <> 1".parse::<DateConstraint>(),
            Err(Error::UnknownOperator("<>".to_string()))
        );
        assert!(matches!(
            "0 < tomorrow".parse::<DateConstraint>(),
            Err(Error::InvalidConstraint(_))
        ));
    }

    #[test]
    fn test_check_indices() {
        assert!(DateConstraint::binary(Operator::Less, 0, 1).check(2).is_ok());
        assert_eq!(
            DateConstraint::binary(Operator::Less, 0, 2).check(2),
            Err(Error::MeetingOutOfRange {
                index: 2,
                n_meetings: 2
            })
        );
        assert_eq!(
            DateConstraint::unary(Operator::Less, 3, day(1)).check(2),
            Err(Error::MeetingOutOfRange {
                index: 3,
                n_meetings: 2
            })
        );
    }

    #[test]
    fn test_satisfied() {
        let assignment = [day(1), day(2)];
        assert!(DateConstraint::binary(Operator::Less, 0, 1).satisfied(&assignment));
        assert!(!DateConstraint::binary(Operator::Greater, 0, 1).satisfied(&assignment));
        assert!(DateConstraint::unary(Operator::GreaterEqual, 1, day(2)).satisfied(&assignment));
        assert!(!DateConstraint::unary(Operator::Equal, 0, day(2)).satisfied(&assignment));
    }
}
