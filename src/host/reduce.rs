//! Sequential reductions.

use crate::backend::ArgExtremum;
use crate::element::Element;

/// First index holding the minimum. `data` must be non-empty.
pub(crate) fn arg_min<T: Element>(data: &[T]) -> ArgExtremum<T> {
    let mut best = ArgExtremum {
        index: 0,
        value: data[0],
    };
    for (index, &value) in data.iter().enumerate().skip(1) {
        if value < best.value {
            best = ArgExtremum { index, value };
        }
    }
    best
}

/// First index holding the maximum. `data` must be non-empty.
pub(crate) fn arg_max<T: Element>(data: &[T]) -> ArgExtremum<T> {
    let mut best = ArgExtremum {
        index: 0,
        value: data[0],
    };
    for (index, &value) in data.iter().enumerate().skip(1) {
        if value > best.value {
            best = ArgExtremum { index, value };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_min_first_occurrence() {
        let r = arg_min(&[4.0f32, 1.0, 7.0, 1.0]);
        assert_eq!(r.index, 1);
        assert_eq!(r.value, 1.0);
    }

    #[test]
    fn test_arg_max_first_occurrence() {
        let r = arg_max(&[2.0f64, 9.0, 9.0, -1.0]);
        assert_eq!(r, ArgExtremum { index: 1, value: 9.0 });
    }

    #[test]
    fn test_single_element() {
        assert_eq!(arg_min(&[3.0f32]).index, 0);
        assert_eq!(arg_max(&[3.0f32]).index, 0);
    }
}
