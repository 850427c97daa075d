//! NaN-aware array statistics.
//!
//! Missing values are represented as `NaN` and are excluded from every
//! denominator here, so `n` is always the number of present values.

use std::{cmp::Ordering, fmt::Debug, iter::zip, ops::AddAssign};

use itertools::Itertools;
use ndarray::{ArrayView1, ArrayView2, Axis};
use num_traits::Float;
use rayon::prelude::*;

pub trait AFloat: Float + AddAssign + Debug + Send + Sync + 'static {}
impl AFloat for f32 {}
impl AFloat for f64 {}

#[inline]
fn present<T: AFloat>(a: ArrayView1<T>) -> impl Iterator<Item = T> + '_ {
    a.into_iter().copied().filter(|x| !x.is_nan())
}

pub fn sum<T: AFloat>(a: ArrayView1<T>) -> T {
    let mut sum = T::zero();
    present(a).for_each(|x| sum += x);
    sum
}

pub fn mean<T: AFloat>(a: ArrayView1<T>) -> T {
    let mut sum = T::zero();
    let mut num = T::zero();
    for x in present(a) {
        sum += x;
        num += T::one();
    }
    if num == T::zero() {
        T::nan()
    } else {
        sum / num
    }
}

pub fn median<T: AFloat>(a: ArrayView1<T>) -> T {
    let mut values = present(a).collect_vec();
    if values.is_empty() {
        return T::nan();
    }
    values.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / (T::one() + T::one())
    }
}

/// sample standard deviation (`n - 1` denominator), `NaN` with fewer than two values
pub fn std<T: AFloat>(a: ArrayView1<T>) -> T {
    let m = mean(a);
    let mut ss = T::zero();
    let mut num = T::zero();
    for x in present(a) {
        let d = x - m;
        ss += d * d;
        num += T::one();
    }
    if num <= T::one() {
        T::nan()
    } else {
        (ss / (num - T::one())).sqrt()
    }
}

pub fn min<T: AFloat>(a: ArrayView1<T>) -> T {
    present(a).fold(T::nan(), |acc, x| if acc.is_nan() || x < acc { x } else { acc })
}

pub fn max<T: AFloat>(a: ArrayView1<T>) -> T {
    present(a).fold(T::nan(), |acc, x| if acc.is_nan() || x > acc { x } else { acc })
}

/// pearson correlation over the positions where both `a` and `b` are present
pub fn corr<T: AFloat>(a: ArrayView1<T>, b: ArrayView1<T>) -> T {
    let valid_indices: Vec<usize> = zip(a.iter(), b.iter())
        .enumerate()
        .filter_map(|(i, (&x, &y))| {
            if x.is_nan() || y.is_nan() {
                None
            } else {
                Some(i)
            }
        })
        .collect();
    if valid_indices.len() < 2 {
        return T::nan();
    }
    let a = a.select(Axis(0), &valid_indices);
    let b = b.select(Axis(0), &valid_indices);
    let a_mean = mean(a.view());
    let b_mean = mean(b.view());
    let a = a.mapv(|x| x - a_mean);
    let b = b.mapv(|x| x - b_mean);
    let cov = a.dot(&b);
    let var1 = a.dot(&a);
    let var2 = b.dot(&b);
    if var1 == T::zero() || var2 == T::zero() {
        return T::nan();
    }
    cov / (var1.sqrt() * var2.sqrt())
}

/// Stable ascending argsort, equal elements keep their original order.
///
/// Floats have no total order, rank them with [`argsort_desc`] instead.
pub fn argsort<T: Ord>(values: &[T]) -> Vec<usize> {
    let mut indices = (0..values.len()).collect_vec();
    indices.sort_by(|&i, &j| values[i].cmp(&values[j]));
    indices
}

/// Stable descending argsort over floats, `NaN`s are placed last.
pub fn argsort_desc<T: AFloat>(values: &[T]) -> Vec<usize> {
    let mut indices = (0..values.len()).collect_vec();
    indices.sort_by(|&i, &j| match (values[i].is_nan(), values[j].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => values[j]
            .partial_cmp(&values[i])
            .unwrap_or(Ordering::Equal),
    });
    indices
}

/// Reduces every row of `a` with `f`.
///
/// With `nthreads <= 1` this is a plain loop, otherwise rows are spread over a
/// dedicated rayon pool of `nthreads` workers. Falls back to the plain loop if
/// the pool cannot be built.
pub fn reduce_axis1<T, R, F>(a: &ArrayView2<T>, nthreads: usize, f: F) -> Vec<R>
where
    T: AFloat,
    R: Send,
    F: Fn(ArrayView1<T>) -> R + Send + Sync,
{
    if nthreads > 1 {
        if let Ok(pool) = rayon::ThreadPoolBuilder::new()
            .num_threads(nthreads)
            .build()
        {
            let rows = a.rows().into_iter().collect_vec();
            return pool.install(|| rows.into_par_iter().map(&f).collect());
        }
    }
    a.rows().into_iter().map(f).collect()
}

pub fn mean_axis1<T: AFloat>(a: &ArrayView2<T>, nthreads: usize) -> Vec<T> {
    reduce_axis1(a, nthreads, mean)
}

pub fn median_axis1<T: AFloat>(a: &ArrayView2<T>, nthreads: usize) -> Vec<T> {
    reduce_axis1(a, nthreads, median)
}

pub fn std_axis1<T: AFloat>(a: &ArrayView2<T>, nthreads: usize) -> Vec<T> {
    reduce_axis1(a, nthreads, std)
}

pub fn sum_axis1<T: AFloat>(a: &ArrayView2<T>, nthreads: usize) -> Vec<T> {
    reduce_axis1(a, nthreads, sum)
}

/// row-wise correlation between `a` and `b`, which should share their shape
pub fn corr_axis1<T: AFloat>(a: &ArrayView2<T>, b: &ArrayView2<T>, nthreads: usize) -> Vec<T> {
    let pairs = zip(a.rows(), b.rows()).collect_vec();
    let compute = |(x, y): (ArrayView1<T>, ArrayView1<T>)| corr(x, y);
    if nthreads > 1 {
        if let Ok(pool) = rayon::ThreadPoolBuilder::new()
            .num_threads(nthreads)
            .build()
        {
            return pool.install(|| pairs.into_par_iter().map(compute).collect());
        }
    }
    pairs.into_iter().map(compute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_stats_skip_nan() {
        let a = array![1.0, f64::NAN, 3.0, 5.0];
        assert!((sum(a.view()) - 9.0).abs() < EPS);
        assert!((mean(a.view()) - 3.0).abs() < EPS);
        assert!((median(a.view()) - 3.0).abs() < EPS);
        assert!((std(a.view()) - 2.0).abs() < EPS);
        assert_eq!(min(a.view()), 1.0);
        assert_eq!(max(a.view()), 5.0);
    }

    #[test]
    fn test_stats_all_missing() {
        let a = array![f64::NAN, f64::NAN];
        assert!(mean(a.view()).is_nan());
        assert!(median(a.view()).is_nan());
        assert!(std(a.view()).is_nan());
        assert!(min(a.view()).is_nan());
        assert_eq!(sum(a.view()), 0.0);
    }

    #[test]
    fn test_median_even() {
        let a = array![4.0f32, 1.0, 3.0, 2.0];
        assert_eq!(median(a.view()), 2.5);
    }

    #[test]
    fn test_corr() {
        let a = array![1.0, 2.0, 3.0, f64::NAN];
        let b = array![2.0, 4.0, 6.0, 1.0];
        assert!((corr(a.view(), b.view()) - 1.0).abs() < EPS);
        let c = array![3.0, 2.0, 1.0, 0.0];
        assert!((corr(a.view(), c.view()) + 1.0).abs() < EPS);
        let flat = array![1.0, 1.0, 1.0, 1.0];
        assert!(corr(a.view(), flat.view()).is_nan());
    }

    #[test]
    fn test_argsort_stable() {
        assert_eq!(argsort(&[2, 0, 1, 0, 2]), vec![1, 3, 2, 0, 4]);
        assert_eq!(argsort(&["b", "a", "b"]), vec![1, 0, 2]);
        assert!(argsort::<usize>(&[]).is_empty());
        assert_eq!(
            argsort_desc(&[1.0, f64::NAN, 3.0, 1.0]),
            vec![2, 0, 3, 1]
        );
    }

    #[test]
    fn test_axis1_threads_agree() {
        let a = Array2::from_shape_fn((17, 5), |(i, j)| (i * 5 + j) as f64);
        let a = a.view();
        assert_eq!(mean_axis1(&a, 1), mean_axis1(&a, 4));
        assert_eq!(std_axis1(&a, 1), std_axis1(&a, 3));
        assert_eq!(corr_axis1(&a, &a, 1), corr_axis1(&a, &a, 2));
        assert!((mean_axis1(&a, 1)[0] - 2.0).abs() < EPS);
    }
}
