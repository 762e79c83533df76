//! Embarrassingly parallel per-pixel / per-node passes.
//!
//! Every unit of work reads shared immutable inputs and writes exactly one
//! output slot, so no synchronisation is needed beyond the implicit join at
//! the end of each pass. With the `rayon` feature disabled the same functions
//! run sequentially and produce identical output.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::algs::consensus::commonest;
use crate::data::FixedArray;
use crate::region_error::RegionError;

/// Default minimum number of items handed to one worker.
pub const DEFAULT_MIN_CHUNK: usize = 1024;

/// `(0..len).map(f).collect()`, distributed over the thread pool.
pub fn par_map_indexed<T, F>(len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        (0..len)
            .into_par_iter()
            .with_min_len(DEFAULT_MIN_CHUNK)
            .map(f)
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..len).map(f).collect()
    }
}

/// Overwrite `out[i] = f(i)` for every slot; `min_chunk` tunes granularity only.
pub fn par_fill_indexed<T, F>(out: &mut [T], min_chunk: usize, f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        out.par_iter_mut()
            .with_min_len(min_chunk.max(1))
            .enumerate()
            .for_each(|(i, slot)| *slot = f(i));
    }
    #[cfg(not(feature = "rayon"))]
    {
        let _ = min_chunk;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(i);
        }
    }
}

/// Per-owner label counts, stored row-major (`owner * label_count + label`).
#[derive(Debug)]
pub struct LabelHistogram {
    owner_count: usize,
    label_count: usize,
    counts: FixedArray<u32>,
}

impl LabelHistogram {
    #[inline]
    pub fn owner_count(&self) -> usize {
        self.owner_count
    }

    #[inline]
    pub fn label_count(&self) -> usize {
        self.label_count
    }

    /// Counts of every label among the pixels of `owner`.
    pub fn row(&self, owner: usize) -> Result<&[u32], RegionError> {
        if owner >= self.owner_count {
            return Err(RegionError::IndexOutOfRange {
                container: "LabelHistogram",
                index: owner,
                len: self.owner_count,
            });
        }
        Ok(self.row_of(owner))
    }

    #[inline]
    fn row_of(&self, owner: usize) -> &[u32] {
        let start = owner * self.label_count;
        &self.counts.as_slice()[start..start + self.label_count]
    }

    /// Fraction of each owner's pixels carrying each label. Owners with no
    /// pixels get an all-zero row.
    pub fn ratios(&self) -> Vec<Vec<f64>> {
        par_map_indexed(self.owner_count, |owner| {
            let row = self.row_of(owner);
            let total: u64 = row.iter().map(|&c| u64::from(c)).sum();
            if total == 0 {
                return vec![0.0; self.label_count];
            }
            row.iter().map(|&c| f64::from(c) / total as f64).collect()
        })
    }

    /// Commonest label per owner (lowest ordinal wins ties); `None` for
    /// owners with no pixels.
    pub fn majority_labels(&self) -> Vec<Option<u32>> {
        par_map_indexed(self.owner_count, |owner| {
            commonest(self.row_of(owner)).ok().map(|l| l as u32)
        })
    }

    pub fn dispose(self) -> usize {
        self.counts.dispose()
    }
}

/// Tally `labels[i]` into the row of `owners[i]`. Negative owners are
/// unassigned pixels and are skipped.
pub fn label_histograms(
    owners: &[i32],
    labels: &[u32],
    owner_count: usize,
    label_count: usize,
) -> Result<LabelHistogram, RegionError> {
    if owners.len() != labels.len() {
        return Err(RegionError::LengthMismatch {
            what: "owners vs labels",
            expected: owners.len(),
            found: labels.len(),
        });
    }
    if let Some(id) = labels.iter().position(|&l| l as usize >= label_count) {
        return Err(RegionError::LabelOutOfRange {
            id,
            label: labels[id],
            label_count,
        });
    }
    if let Some(id) = owners.iter().position(|&o| o >= 0 && o as usize >= owner_count) {
        return Err(RegionError::IdOutOfDomain {
            id: owners[id] as usize,
            domain: owner_count,
        });
    }

    let width = owner_count * label_count;
    let accumulate = |mut acc: Vec<u32>, i: usize| {
        let owner = owners[i];
        if owner >= 0 {
            acc[owner as usize * label_count + labels[i] as usize] += 1;
        }
        acc
    };

    #[cfg(feature = "rayon")]
    let counts = (0..owners.len())
        .into_par_iter()
        .with_min_len(DEFAULT_MIN_CHUNK)
        .fold(|| vec![0u32; width], accumulate)
        .reduce(
            || vec![0u32; width],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );
    #[cfg(not(feature = "rayon"))]
    let counts = (0..owners.len()).fold(vec![0u32; width], accumulate);

    Ok(LabelHistogram {
        owner_count,
        label_count,
        counts: FixedArray::from_vec(counts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn par_map_matches_sequential() {
        let got = par_map_indexed(5000, |i| i * i);
        assert!(got.iter().enumerate().all(|(i, &v)| v == i * i));
    }

    #[test]
    fn par_fill_writes_every_slot() {
        let mut out = vec![0u64; 3000];
        par_fill_indexed(&mut out, 7, |i| i as u64 + 1);
        assert_eq!(out.iter().sum::<u64>(), 3000 * 3001 / 2);
    }

    #[test]
    fn histograms_ratios_and_majorities() {
        let owners = [0, 0, 0, 1, 1, -1, 2];
        let labels = [2, 1, 2, 0, 1, 0, 1];
        let h = label_histograms(&owners, &labels, 4, 3).unwrap();
        assert_eq!(h.row(0).unwrap(), &[0, 1, 2]);
        assert_eq!(h.row(1).unwrap(), &[1, 1, 0]);
        assert_eq!(h.row(3).unwrap(), &[0, 0, 0]);
        assert!(matches!(
            h.row(4),
            Err(RegionError::IndexOutOfRange { index: 4, len: 4, .. })
        ));
        let r = h.ratios();
        assert!((r[0][2] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r[3], vec![0.0, 0.0, 0.0]);
        // Owner 1 ties between labels 0 and 1; the lower ordinal wins.
        assert_eq!(h.majority_labels(), vec![Some(2), Some(0), Some(1), None]);
    }

    #[test]
    fn histograms_reject_out_of_range_input() {
        assert!(matches!(
            label_histograms(&[0], &[3], 1, 3),
            Err(RegionError::LabelOutOfRange { label: 3, .. })
        ));
        assert!(matches!(
            label_histograms(&[1], &[0], 1, 3),
            Err(RegionError::IdOutOfDomain { id: 1, domain: 1 })
        ));
        assert!(label_histograms(&[0, 0], &[0], 1, 1).is_err());
    }
}
