use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, TrainError};

/// Builds a design matrix from row vectors, rejecting ragged or empty input.
pub fn rows_to_matrix(rows: &[Vec<f32>]) -> Result<Array2<f32>> {
    let first = rows
        .first()
        .ok_or_else(|| TrainError::shape("row count", 1, 0))?;
    let d = first.len();
    if d == 0 {
        return Err(TrainError::shape("feature count", 1, 0));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != d) {
        return Err(TrainError::shape("row length", d, row.len()));
    }

    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), d), flat)
        .map_err(|_| TrainError::shape("row length", d, rows.len()))
}

/// Training inputs must be non-empty with one target per row.
pub fn check_training_shape(x: ArrayView2<f32>, y: ArrayView1<f32>) -> Result<()> {
    let (n, d) = x.dim();
    if n == 0 {
        return Err(TrainError::shape("row count", 1, 0));
    }
    if d == 0 {
        return Err(TrainError::shape("feature count", 1, 0));
    }
    if y.len() != n {
        return Err(TrainError::shape("target length", n, y.len()));
    }
    Ok(())
}

/// Row order for one epoch split into consecutive chunks of `chunk_len`.
/// The last chunk is shorter when `n` is not a multiple of `chunk_len`.
pub fn epoch_chunks<R: Rng + ?Sized>(
    n: usize,
    chunk_len: usize,
    shuffle: bool,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..n).collect();
    if shuffle {
        order.shuffle(rng);
    }
    order.chunks(chunk_len).map(|chunk| chunk.to_vec()).collect()
}

/// Index of the smallest score. Ties keep the earliest index and NaN never
/// beats a number.
pub fn argmin<I>(scores: I) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, score) in scores.into_iter().enumerate() {
        let better = match best {
            None => true,
            Some((_, incumbent)) => {
                score < incumbent || (incumbent.is_nan() && !score.is_nan())
            }
        };
        if better {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rows_to_matrix() {
        let matrix = rows_to_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix[[1, 0]], 3.0);
    }

    #[test]
    fn test_rows_to_matrix_ragged() {
        let err = rows_to_matrix(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            TrainError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_rows_to_matrix_empty() {
        assert!(rows_to_matrix(&[]).is_err());
        assert!(rows_to_matrix(&[vec![]]).is_err());
    }

    #[test]
    fn test_epoch_chunks_partial_tail() {
        let mut rng = StdRng::seed_from_u64(0);
        let chunks = epoch_chunks(10, 4, false, &mut rng);

        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_epoch_chunks_shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen: Vec<usize> = epoch_chunks(50, 8, true, &mut rng)
            .into_iter()
            .flatten()
            .collect();
        seen.sort_unstable();

        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_argmin_first_seen_wins() {
        assert_eq!(argmin(vec![3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(argmin(vec![2.0, 2.0, 2.0]), Some(0));
    }

    #[test]
    fn test_argmin_skips_nan() {
        assert_eq!(argmin(vec![f32::NAN, 5.0, f32::NAN, 4.0]), Some(3));
        assert_eq!(argmin(vec![f32::NAN, f32::NAN]), Some(0));
        assert_eq!(argmin(Vec::<f32>::new()), None);
    }
}
