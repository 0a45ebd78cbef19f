use crate::domain::Domain;
use chrono::NaiveDate;

/// Decides the order in which the dates of a domain are tried during search.
pub trait ValueSelector {
    fn candidates(&self, dom: &Domain) -> Vec<NaiveDate>;
}

/// Earliest date first.
pub struct MinValueSelector {}

impl ValueSelector for MinValueSelector {
    fn candidates(&self, dom: &Domain) -> Vec<NaiveDate> {
        dom.iter().collect()
    }
}

/// Latest date first.
pub struct MaxValueSelector {}

impl ValueSelector for MaxValueSelector {
    fn candidates(&self, dom: &Domain) -> Vec<NaiveDate> {
        let mut dates = dom.iter().collect::<Vec<_>>();
        dates.reverse();
        dates
    }
}
