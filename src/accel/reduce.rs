//! Block-tree reductions.

use crate::backend::ArgExtremum;
use crate::element::Element;
use crate::launch::KernelLaunch;

use super::grid::grid_reduce;

/// Keeps the smaller value; equal values resolve to the lower index so the
/// result does not depend on which lanes meet first.
#[inline]
fn prefer_min<T: Element>(a: ArgExtremum<T>, b: ArgExtremum<T>) -> ArgExtremum<T> {
    if b.value < a.value || (b.value == a.value && b.index < a.index) {
        b
    } else {
        a
    }
}

#[inline]
fn prefer_max<T: Element>(a: ArgExtremum<T>, b: ArgExtremum<T>) -> ArgExtremum<T> {
    if b.value > a.value || (b.value == a.value && b.index < a.index) {
        b
    } else {
        a
    }
}

pub(crate) fn sum<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
    grid_reduce(launch, data, |_, v| v, |a, b| a + b).unwrap_or_else(T::zero)
}

pub(crate) fn min<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
    grid_reduce(launch, data, |_, v| v, |a: T, b: T| if b < a { b } else { a })
        .unwrap_or_else(T::nan)
}

pub(crate) fn max<T: Element>(launch: &KernelLaunch, data: &[T]) -> T {
    grid_reduce(launch, data, |_, v| v, |a: T, b: T| if b > a { b } else { a })
        .unwrap_or_else(T::nan)
}

pub(crate) fn arg_min<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
    grid_reduce(launch, data, |index, value| ArgExtremum { index, value }, prefer_min)
        .unwrap_or(ArgExtremum {
            index: 0,
            value: T::nan(),
        })
}

pub(crate) fn arg_max<T: Element>(launch: &KernelLaunch, data: &[T]) -> ArgExtremum<T> {
    grid_reduce(launch, data, |index, value| ArgExtremum { index, value }, prefer_max)
        .unwrap_or(ArgExtremum {
            index: 0,
            value: T::nan(),
        })
}
