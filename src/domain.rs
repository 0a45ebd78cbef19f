use crate::error::Error;
use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    Same,
    Modified,
}

/// Candidate dates of one meeting, stored as a bitset of day offsets from
/// the start of the requested range. Dates are only ever removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    data: Vec<u64>,
    start: NaiveDate,
    span: u64,
    size: u64,
}

pub struct DomainIterator<'a> {
    iter: std::slice::Iter<'a, u64>,
    block: u64,
    base: u64,
    start: NaiveDate,
}

impl Iterator for DomainIterator<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while self.block == 0 {
            self.block = *self.iter.next()?;
            self.base += 64;
        }
        let shift = self.block.trailing_zeros() as u64;
        self.block ^= 1u64 << shift;
        Some(self.start + Days::new(self.base - 64 + shift))
    }
}

impl Domain {
    /// Full domain holding every date from `start` to `end` inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        let span = (end - start).num_days() as u64 + 1;
        let blocks = span.div_ceil(64) as usize;
        let mut data = vec![u64::MAX; blocks];
        if span % 64 > 0 {
            data[blocks - 1] = (1u64 << (span % 64)) - 1;
        }
        Ok(Self {
            data,
            start,
            span,
            size: span,
        })
    }

    fn offset(&self, date: NaiveDate) -> Option<(usize, u64)> {
        let days = (date - self.start).num_days();
        if days < 0 || days as u64 >= self.span {
            return None;
        }
        let days = days as u64;
        Some(((days / 64) as usize, days % 64))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.offset(date) {
            Some((block, shift)) => self.data[block] & (1u64 << shift) != 0,
            None => false,
        }
    }

    pub fn remove(&mut self, date: NaiveDate) -> DomainState {
        match self.offset(date) {
            Some((block, shift)) if self.data[block] & (1u64 << shift) != 0 => {
                self.data[block] ^= 1u64 << shift;
                self.size -= 1;
                DomainState::Modified
            }
            _ => DomainState::Same,
        }
    }

    /// Restricts the domain to `{date}`, or empties it when `date` is absent.
    pub fn assign(&mut self, date: NaiveDate) -> DomainState {
        if self.contains(date) {
            if self.size == 1 {
                return DomainState::Same;
            }
            self.clear();
            if let Some((block, shift)) = self.offset(date) {
                self.data[block] = 1u64 << shift;
                self.size = 1;
            }
            DomainState::Modified
        } else {
            self.clear()
        }
    }

    pub fn clear(&mut self) -> DomainState {
        if self.size == 0 {
            return DomainState::Same;
        }
        self.data.iter_mut().for_each(|b| *b = 0);
        self.size = 0;
        DomainState::Modified
    }

    /// Keeps only the dates for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(NaiveDate) -> bool) -> DomainState {
        let removed = self.iter().filter(|&d| !keep(d)).collect::<Vec<_>>();
        for &date in &removed {
            self.remove(date);
        }
        if removed.is_empty() {
            DomainState::Same
        } else {
            DomainState::Modified
        }
    }

    pub fn min(&self) -> Option<NaiveDate> {
        self.iter().next()
    }

    pub fn max(&self) -> Option<NaiveDate> {
        let (block, bits) = self
            .data
            .iter()
            .enumerate()
            .rfind(|(_, bits)| **bits != 0)?;
        let shift = 63 - bits.leading_zeros() as u64;
        Some(self.start + Days::new(block as u64 * 64 + shift))
    }

    pub fn iter(&self) -> DomainIterator<'_> {
        DomainIterator {
            iter: self.data.iter(),
            block: 0,
            base: 0,
            start: self.start,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_assigned(&self) -> bool {
        self.size == 1
    }
}

/// Builds the Domain Store: one full domain per meeting.
pub fn initialize(
    n_meetings: usize,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<Vec<Domain>, Error> {
    let full = Domain::new(range_start, range_end)?;
    Ok(vec![full; n_meetings])
}
