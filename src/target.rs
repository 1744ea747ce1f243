//! Target allocation maps keyed by case-normalized ticker.

use rustc_hash::FxHashMap;

use crate::types::Ticker;

/// Target allocation percentages (50.0 means 50%), keyed by [`Ticker`].
///
/// Keeps the order in which tickers were first given. A ticker repeated
/// under a different case overwrites the earlier value in place.
///
/// ```
/// use sharebook::TargetAllocations;
///
/// let targets = TargetAllocations::from_iter([("AAPL", 40.0), ("goog", 60.0), ("aapl", 45.0)]);
/// assert_eq!(targets.len(), 2);
/// assert_eq!(targets.get("Aapl"), Some(45.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetAllocations {
    entries: Vec<(Ticker, f64)>,
    index: FxHashMap<Ticker, usize>,
}

impl TargetAllocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target for `ticker` (any case).
    pub fn insert(&mut self, ticker: &str, percent: f64) {
        let ticker = Ticker::new(ticker);
        match self.index.get(&ticker) {
            Some(&i) => self.entries[i].1 = percent,
            None => {
                self.index.insert(ticker.clone(), self.entries.len());
                self.entries.push((ticker, percent));
            }
        }
    }

    /// Target for `ticker` (any case), if present.
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.index
            .get(&Ticker::new(ticker))
            .map(|&i| self.entries[i].1)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, f64)> {
        self.entries.iter().map(|(t, p)| (t, *p))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Working copy used while matching targets against holdings.
    pub(crate) fn pending(&self) -> Pending<'_> {
        Pending {
            targets: self,
            consumed: vec![false; self.entries.len()],
        }
    }
}

impl<T: AsRef<str>> FromIterator<(T, f64)> for TargetAllocations {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        let mut targets = Self::new();
        for (ticker, percent) in iter {
            targets.insert(ticker.as_ref(), percent);
        }
        targets
    }
}

/// Targets not yet claimed by a holding. Taking a ticker marks it consumed;
/// whatever is left afterwards names tickers the ledger does not hold.
pub(crate) struct Pending<'a> {
    targets: &'a TargetAllocations,
    consumed: Vec<bool>,
}

impl Pending<'_> {
    /// Claim the target for `ticker`, or `None` if absent or already claimed.
    pub(crate) fn take(&mut self, ticker: &Ticker) -> Option<f64> {
        let &i = self.targets.index.get(ticker)?;
        if std::mem::replace(&mut self.consumed[i], true) {
            return None;
        }
        Some(self.targets.entries[i].1)
    }

    /// First unclaimed ticker in insertion order.
    pub(crate) fn first_remaining(&self) -> Option<&Ticker> {
        self.targets
            .entries
            .iter()
            .zip(&self.consumed)
            .find(|(_, consumed)| !**consumed)
            .map(|((ticker, _), _)| ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_keys() {
        let targets = TargetAllocations::from_iter([("AAPL", 50.0), ("Goog", 50.0)]);
        assert_eq!(targets.get("aapl"), Some(50.0));
        assert_eq!(targets.get("GOOG"), Some(50.0));
        assert_eq!(targets.get("msft"), None);
    }

    #[test]
    fn duplicate_keeps_first_position() {
        let targets = TargetAllocations::from_iter([("aapl", 10.0), ("goog", 20.0), ("AAPL", 30.0)]);
        let entries: Vec<(&str, f64)> = targets.iter().map(|(t, p)| (t.as_str(), p)).collect();
        assert_eq!(entries, vec![("aapl", 30.0), ("goog", 20.0)]);
    }

    #[test]
    fn pending_tracks_unclaimed() {
        let targets = TargetAllocations::from_iter([("aapl", 50.0), ("msft", 25.0), ("goog", 25.0)]);
        let mut pending = targets.pending();

        assert_eq!(pending.take(&Ticker::new("aapl")), Some(50.0));
        assert_eq!(pending.take(&Ticker::new("aapl")), None);
        assert_eq!(pending.take(&Ticker::new("spy")), None);
        assert_eq!(pending.first_remaining(), Some(&Ticker::new("msft")));

        pending.take(&Ticker::new("msft"));
        pending.take(&Ticker::new("goog"));
        assert_eq!(pending.first_remaining(), None);

        // The source map is untouched.
        assert_eq!(targets.len(), 3);
    }
}
