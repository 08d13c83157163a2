//! Date-indexed numeric series.
//!
//! Missing values are NaN. Window and difference operations are positional
//! over the stored dates, so a gap in the calendar is not filled.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: BTreeMap<NaiveDate, f64>,
}

impl Series {
    /// Build a series from optional values; `None` becomes NaN.
    /// Later duplicates overwrite earlier ones.
    pub fn from_options<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        iter.into_iter()
            .map(|(d, v)| (d, v.unwrap_or(f64::NAN)))
            .collect()
    }

    /// Sum the values that share a date.
    pub fn group_sum<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut points = BTreeMap::new();
        for (date, value) in iter {
            *points.entry(date).or_insert(0.0) += value;
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.points.get(date).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.points.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.points.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &f64> {
        self.points.values()
    }

    fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            points: self.points.iter().map(|(d, v)| (*d, f(*v))).collect(),
        }
    }

    fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        Self {
            points: dates.into_iter().zip(values).collect(),
        }
    }

    /// First difference; the first element is NaN.
    pub fn diff(&self) -> Self {
        let dates: Vec<NaiveDate> = self.points.keys().copied().collect();
        let values: Vec<f64> = self.points.values().copied().collect();
        let diffs = (0..values.len())
            .map(|i| {
                if i == 0 {
                    f64::NAN
                } else {
                    values[i] - values[i - 1]
                }
            })
            .collect();
        Self::from_parts(dates, diffs)
    }

    /// Rolling mean over `window` positions.
    ///
    /// A window with any NaN, or one that runs past either end, yields NaN.
    /// Centred windows put position `i` at `i + (window - 1) / 2 + 1 - window
    /// ..= i + (window - 1) / 2`.
    pub fn rolling_mean(&self, window: usize, centered: bool) -> Self {
        if window <= 1 {
            return self.clone();
        }

        let dates: Vec<NaiveDate> = self.points.keys().copied().collect();
        let values: Vec<f64> = self.points.values().copied().collect();
        let n = values.len();
        let offset = if centered { (window - 1) / 2 } else { 0 };

        let means = (0..n)
            .map(|i| {
                let end = i + offset + 1;
                if end < window || end > n {
                    return f64::NAN;
                }
                let slice = &values[end - window..end];
                if slice.iter().any(|v| v.is_nan()) {
                    f64::NAN
                } else {
                    slice.iter().sum::<f64>() / window as f64
                }
            })
            .collect();
        Self::from_parts(dates, means)
    }

    /// Running total. NaN entries stay NaN and do not reset the total.
    pub fn cumsum(&self) -> Self {
        let mut total = 0.0;
        Self {
            points: self
                .points
                .iter()
                .map(|(d, v)| {
                    if v.is_nan() {
                        (*d, f64::NAN)
                    } else {
                        total += v;
                        (*d, total)
                    }
                })
                .collect(),
        }
    }

    /// Element-wise `self / other` on the dates both series have.
    /// Division by zero yields NaN.
    pub fn ratio(&self, other: &Series) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter_map(|(d, num)| {
                    other.points.get(d).map(|den| {
                        let value = if *den == 0.0 { f64::NAN } else { num / den };
                        (*d, value)
                    })
                })
                .collect(),
        }
    }

    /// `100 * self / total` on the common dates.
    pub fn percent_of(&self, total: &Series) -> Self {
        self.ratio(total).scale(100.0)
    }

    pub fn scale(&self, k: f64) -> Self {
        self.map_values(|v| v * k)
    }

    /// Divide every value by a scalar; a zero divisor yields NaN.
    pub fn per(&self, divisor: f64) -> Self {
        if divisor == 0.0 {
            self.map_values(|_| f64::NAN)
        } else {
            self.map_values(|v| v / divisor)
        }
    }

    pub fn dropna(&self) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|(_, v)| !v.is_nan())
                .map(|(d, v)| (*d, *v))
                .collect(),
        }
    }
}

impl FromIterator<(NaiveDate, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
