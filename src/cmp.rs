use crate::error::Error;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Relation between the left and the right operand of a constraint,
/// read as "left `OP` right".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::Greater,
        Operator::Less,
        Operator::GreaterEqual,
        Operator::LessEqual,
    ];

    pub fn holds<T: Ord>(&self, lhs: &T, rhs: &T) -> bool {
        let ord = lhs.cmp(rhs);
        match self {
            Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::Greater => ord == Ordering::Greater,
            Operator::Less => ord == Ordering::Less,
            Operator::GreaterEqual => ord != Ordering::Less,
            Operator::LessEqual => ord != Ordering::Greater,
        }
    }

    /// Operator with the operands swapped: `a OP b` iff `b OP.flip() a`.
    pub fn flip(&self) -> Operator {
        match self {
            Operator::Equal => Operator::Equal,
            Operator::NotEqual => Operator::NotEqual,
            Operator::Greater => Operator::Less,
            Operator::Less => Operator::Greater,
            Operator::GreaterEqual => Operator::LessEqual,
            Operator::LessEqual => Operator::GreaterEqual,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            ">" => Ok(Operator::Greater),
            "<" => Ok(Operator::Less),
            ">=" => Ok(Operator::GreaterEqual),
            "<=" => Ok(Operator::LessEqual),
            _ => Err(Error::UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
