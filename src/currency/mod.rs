//! Currency universe, cross-rate matrices, and dated rate snapshots.
//!
//! All rates are quoted against the hryvnia: a snapshot stores how many UAH
//! one unit of each currency is worth, and every ordered cross rate is
//! derived from those magnitudes. USDT is pegged to USD.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Closed currency set the console trades in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Currency {
    Uah,
    Usd,
    Usdt,
    Rub,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Uah, Currency::Usd, Currency::Usdt, Currency::Rub];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Uah => "UAH",
            Currency::Usd => "USD",
            Currency::Usdt => "USDT",
            Currency::Rub => "RUB",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full ordered cross-rate matrix derived from the two independently quoted
/// magnitudes (UAH per USD and UAH per RUB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateMatrix {
    /// UAH value of one unit of each currency, indexed like `Currency::ALL`.
    bases: [f64; 4],
}

impl RateMatrix {
    pub fn from_bases(usd: f64, rub: f64) -> Self {
        Self {
            bases: [1.0, usd, usd, rub],
        }
    }

    fn base(&self, currency: Currency) -> f64 {
        self.bases[currency as usize]
    }

    /// Units of `to` that one unit of `from` buys. A zero or non-finite
    /// operand collapses the rate to 0.0 instead of panicking.
    pub fn rate(&self, from: Currency, to: Currency) -> f64 {
        safe_div(self.base(from), self.base(to))
    }

    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        amount * self.rate(from, to)
    }
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// One persisted exchange-rate row: the four base magnitudes plus the twelve
/// derived ordered cross rates, frozen for a single date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub uah: f64,
    pub usd: f64,
    pub usdt: f64,
    pub rub: f64,
    pub uah_usd: f64,
    pub uah_usdt: f64,
    pub uah_rub: f64,
    pub usd_uah: f64,
    pub usd_usdt: f64,
    pub usd_rub: f64,
    pub usdt_uah: f64,
    pub usdt_usd: f64,
    pub usdt_rub: f64,
    pub rub_uah: f64,
    pub rub_usd: f64,
    pub rub_usdt: f64,
}

impl RateSnapshot {
    /// Freezes a dated snapshot from the two independently quoted magnitudes.
    pub fn compute(date: NaiveDate, usd: f64, rub: f64) -> Result<Self> {
        if !usd.is_finite() || usd < 0.0 || !rub.is_finite() || rub < 0.0 {
            return Err(CoreError::Validation(format!(
                "exchange rates must be finite and non-negative (usd {usd}, rub {rub})"
            )));
        }
        let matrix = RateMatrix::from_bases(usd, rub);
        Ok(Self {
            date,
            uah: 1.0,
            usd,
            usdt: usd,
            rub,
            uah_usd: matrix.rate(Currency::Uah, Currency::Usd),
            uah_usdt: matrix.rate(Currency::Uah, Currency::Usdt),
            uah_rub: matrix.rate(Currency::Uah, Currency::Rub),
            usd_uah: matrix.rate(Currency::Usd, Currency::Uah),
            usd_usdt: matrix.rate(Currency::Usd, Currency::Usdt),
            usd_rub: matrix.rate(Currency::Usd, Currency::Rub),
            usdt_uah: matrix.rate(Currency::Usdt, Currency::Uah),
            usdt_usd: matrix.rate(Currency::Usdt, Currency::Usd),
            usdt_rub: matrix.rate(Currency::Usdt, Currency::Rub),
            rub_uah: matrix.rate(Currency::Rub, Currency::Uah),
            rub_usd: matrix.rate(Currency::Rub, Currency::Usd),
            rub_usdt: matrix.rate(Currency::Rub, Currency::Usdt),
        })
    }

    /// Rebuilds the live matrix this row was frozen from.
    pub fn matrix(&self) -> RateMatrix {
        RateMatrix::from_bases(self.usd, self.rub)
    }
}

/// Append-only, newest-first history of dated rate snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotBook {
    #[serde(default)]
    snapshots: Vec<RateSnapshot>,
}

impl SnapshotBook {
    /// Records a new row. One row per date; a second snapshot for an already
    /// recorded date is rejected.
    pub fn record(&mut self, snapshot: RateSnapshot) -> Result<()> {
        if self.snapshots.iter().any(|s| s.date == snapshot.date) {
            return Err(CoreError::Validation(format!(
                "snapshot for {} already recorded",
                snapshot.date
            )));
        }
        self.snapshots.push(snapshot);
        self.snapshots.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(())
    }

    /// Most recent row, if any. Display layers fall back to this when a
    /// fresh fetch is unavailable.
    pub fn latest(&self) -> Option<&RateSnapshot> {
        self.snapshots.first()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Fixed-size page of history, page numbers starting at 1, newest first.
    pub fn page(&self, page: usize, page_size: usize) -> &[RateSnapshot] {
        if page == 0 || page_size == 0 {
            return &[];
        }
        let start = (page - 1).saturating_mul(page_size);
        if start >= self.snapshots.len() {
            return &[];
        }
        let end = (start + page_size).min(self.snapshots.len());
        &self.snapshots[start..end]
    }

    /// All rows dated within `[from, to]`, newest first.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&RateSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.date >= from && s.date <= to)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cross_rates_are_reciprocal() {
        let matrix = RateMatrix::from_bases(43.0, 0.5);
        for from in Currency::ALL {
            for to in Currency::ALL {
                let forward = matrix.rate(from, to);
                let backward = matrix.rate(to, from);
                assert!(
                    (forward * backward - 1.0).abs() < 1e-9,
                    "{from}->{to} not reciprocal: {forward} * {backward}"
                );
            }
        }
    }

    #[test]
    fn usd_rub_rate_follows_shared_numeraire() {
        let matrix = RateMatrix::from_bases(43.0, 0.5);
        assert!((matrix.rate(Currency::Usd, Currency::Rub) - 86.0).abs() < 1e-9);
        assert!((matrix.rate(Currency::Usd, Currency::Uah) - 43.0).abs() < 1e-9);
        assert!((matrix.rate(Currency::Uah, Currency::Usd) - 1.0 / 43.0).abs() < 1e-9);
    }

    #[test]
    fn usdt_is_pegged_to_usd() {
        let matrix = RateMatrix::from_bases(41.25, 0.47);
        assert_eq!(matrix.rate(Currency::Usd, Currency::Usdt), 1.0);
        assert_eq!(matrix.rate(Currency::Usdt, Currency::Usd), 1.0);
        assert_eq!(
            matrix.rate(Currency::Usdt, Currency::Rub),
            matrix.rate(Currency::Usd, Currency::Rub)
        );
    }

    #[test]
    fn degenerate_operands_collapse_to_zero() {
        let matrix = RateMatrix::from_bases(43.0, 0.0);
        assert_eq!(matrix.rate(Currency::Usd, Currency::Rub), 0.0);
        assert_eq!(matrix.rate(Currency::Rub, Currency::Usd), 0.0);
        assert_eq!(matrix.convert(100.0, Currency::Rub, Currency::Uah), 0.0);

        let broken = RateMatrix::from_bases(f64::NAN, 0.5);
        assert_eq!(broken.rate(Currency::Usd, Currency::Rub), 0.0);
    }

    #[test]
    fn snapshot_freezes_all_sixteen_fields() {
        let snapshot = RateSnapshot::compute(date(2025, 3, 1), 43.0, 0.5).unwrap();
        assert_eq!(snapshot.uah, 1.0);
        assert_eq!(snapshot.usdt, 43.0);
        assert!((snapshot.usd_uah - 43.0).abs() < 1e-9);
        assert!((snapshot.usd_rub - 86.0).abs() < 1e-9);
        assert!((snapshot.rub_usd - 0.5 / 43.0).abs() < 1e-9);
        assert!((snapshot.uah_rub - 2.0).abs() < 1e-9);
        assert_eq!(snapshot.usdt_usd, 1.0);
    }

    #[test]
    fn snapshot_rejects_bad_magnitudes() {
        assert!(RateSnapshot::compute(date(2025, 3, 1), -1.0, 0.5).is_err());
        assert!(RateSnapshot::compute(date(2025, 3, 1), 43.0, f64::INFINITY).is_err());
    }

    fn book_with_days(days: &[u32]) -> SnapshotBook {
        let mut book = SnapshotBook::default();
        for day in days {
            book.record(RateSnapshot::compute(date(2025, 1, *day), 40.0 + *day as f64, 0.5).unwrap())
                .unwrap();
        }
        book
    }

    #[test]
    fn book_keeps_one_row_per_date() {
        let mut book = book_with_days(&[3]);
        let again = RateSnapshot::compute(date(2025, 1, 3), 44.0, 0.6).unwrap();
        assert!(book.record(again).is_err());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn book_paginates_newest_first() {
        let book = book_with_days(&[1, 2, 3, 4, 5]);
        assert_eq!(book.latest().unwrap().date, date(2025, 1, 5));

        let first = book.page(1, 2);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].date, date(2025, 1, 5));
        assert_eq!(first[1].date, date(2025, 1, 4));

        assert_eq!(book.page(3, 2).len(), 1);
        assert!(book.page(4, 2).is_empty());
        assert!(book.page(0, 2).is_empty());
    }

    #[test]
    fn book_answers_date_ranges() {
        let book = book_with_days(&[1, 2, 3, 4, 5]);
        let slice = book.range(date(2025, 1, 2), date(2025, 1, 4));
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].date, date(2025, 1, 4));
        assert_eq!(slice[2].date, date(2025, 1, 2));
        assert!(book.range(date(2025, 2, 1), date(2025, 2, 28)).is_empty());
    }
}
