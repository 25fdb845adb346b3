use std::error::Error;
use std::fmt;

/// InputValueError is used if some timer option or parameter does not fulfill the posed
/// requirements, e.g., a poll interval of zero.
#[derive(Debug, Clone)]
pub struct InputValueError;

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value")
    }
}

impl Error for InputValueError {}

/// argmin returns the index of the first minimum value in the array x, None if x is empty. Equal
/// values do not replace an earlier minimum.
pub fn argmin<T: std::cmp::PartialOrd>(x: &[T]) -> Option<usize> {
    let mut vals = x.iter().enumerate();
    let (mut idx_min, mut val_min) = vals.next()?;

    for (idx, val) in vals {
        if val < val_min {
            idx_min = idx;
            val_min = val;
        }
    }

    Some(idx_min)
}

pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that sort the array x (stable sort, such that equal lap times keep
/// their arrival order). Incomparable values (NaN) are treated as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    match order {
        SortOrder::Ascending => idxs.sort_by(|&a, &b| {
            x[a].partial_cmp(&x[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortOrder::Descending => idxs.sort_by(|&a, &b| {
            x[b].partial_cmp(&x[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    };

    idxs
}
