use crate::consistency::PropagationLevel;
use crate::value_selector::{MinValueSelector, ValueSelector};
use std::time::Duration;

pub struct Config {
    pub propagation: PropagationLevel,
    pub value_selector: Box<dyn ValueSelector>,
    /// If false, the search stops after the first valid assignment.
    pub all_solutions: bool,
    /// Checked cooperatively while searching; expiry yields an unknown outcome.
    pub time_limit: Option<Duration>,
}

impl Config {
    pub fn new(
        propagation: PropagationLevel,
        value_selector: Box<dyn ValueSelector>,
        all_solutions: bool,
        time_limit: Option<Duration>,
    ) -> Self {
        Self {
            propagation,
            value_selector,
            all_solutions,
            time_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            propagation: PropagationLevel::default(),
            value_selector: Box::new(MinValueSelector {}),
            all_solutions: false,
            time_limit: None,
        }
    }
}
