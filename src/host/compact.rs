//! Sequential compaction, sort and scan.

use crate::element::Element;

/// Strictly positive elements in input order.
pub(crate) fn filter_greater_zero<T: Element>(input: &[T]) -> Vec<T> {
    input.iter().copied().filter(|&v| v > T::zero()).collect()
}

/// Ascending total-order sort into `output[..input.len()]`.
pub(crate) fn sort<T: Element>(input: &[T], output: &mut [T]) {
    let output = &mut output[..input.len()];
    output.copy_from_slice(input);
    output.sort_unstable_by(T::total_order);
}

/// Inclusive prefix sum into `output[..input.len()]`.
pub(crate) fn scan<T: Element>(input: &[T], output: &mut [T]) {
    let mut sum = T::zero();
    for (o, &v) in output.iter_mut().zip(input) {
        sum = sum + v;
        *o = sum;
    }
}
