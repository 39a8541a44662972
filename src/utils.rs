//! Array helpers shared by the data types: broadcasting, repeat removal and
//! short textual summaries.

use std::fmt::Display;

use ndarray::{ArrayD, ArrayViewD, Axis, Slice, Zip};

/// Broadcast shapes following the usual trailing-dimension rules.
///
/// Returns `None` if two shapes differ in a dimension where neither is 1.
pub fn broadcast_shapes<'a>(shapes: impl IntoIterator<Item = &'a [usize]>) -> Option<Vec<usize>> {
    let shapes: Vec<&[usize]> = shapes.into_iter().collect();
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut result = vec![1; ndim];

    for shape in shapes {
        let offset = ndim - shape.len();
        for (out, &dim) in result[offset..].iter_mut().zip(shape) {
            if *out == 1 {
                *out = dim;
            } else if dim != 1 && dim != *out {
                return None;
            }
        }
    }
    Some(result)
}

/// Collapse every axis along which all values are repeated to length 1.
///
/// An axis is collapsible if, in every lane along it, all values are pairwise
/// within `tol` (absolute), i.e. `max - min <= tol`. The first slice is kept.
/// Each axis is tested against the full input, so the result does not depend
/// on the order in which axes are visited.
pub fn remove_repeat(array: ArrayViewD<'_, f64>, tol: f64) -> ArrayD<f64> {
    let collapsible: Vec<bool> = (0..array.ndim())
        .map(|axis| can_be_singleton(&array, Axis(axis), tol))
        .collect();

    let mut view = array.view();
    for (axis, _) in collapsible.iter().enumerate().filter(|(_, c)| **c) {
        view.slice_axis_inplace(Axis(axis), Slice::from(0..1));
    }
    view.to_owned()
}

fn can_be_singleton(array: &ArrayViewD<'_, f64>, axis: Axis, tol: f64) -> bool {
    match array.len_of(axis) {
        0 => false,
        1 => true,
        _ => Zip::from(array.lanes(axis)).all(|lane| {
            // NaN never counts as a repeat
            lane.fold(Some((f64::INFINITY, f64::NEG_INFINITY)), |range, &v| {
                range
                    .filter(|_| !v.is_nan())
                    .map(|(min, max)| (min.min(v), max.max(v)))
            })
            .is_some_and(|(min, max)| max - min <= tol)
        }),
    }
}

/// Short listing of values, eliding the middle if there are more than `threshold`.
///
/// The elided form shows `threshold / 2` (at least 1) values at each end.
///
/// ```
/// use ktrajectory::utils::summarize_values;
/// assert_eq!(summarize_values(&[1, 2, 3], 7), "[1, 2, 3]");
/// assert_eq!(summarize_values(&[1, 2, 3, 4, 5, 6, 7, 8], 4), "[1, 2, ..., 7, 8]");
/// ```
pub fn summarize_values<T: Display>(values: &[T], threshold: usize) -> String {
    let join = |items: &[T]| {
        items
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if values.len() <= threshold {
        format!("[{}]", join(values))
    } else {
        let edge = (threshold / 2).max(1);
        format!(
            "[{}, ..., {}]",
            join(&values[..edge]),
            join(&values[values.len() - edge..])
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn broadcast_trailing_dimensions() {
        let a: &[usize] = &[1, 1, 1, 3];
        let b: &[usize] = &[2, 1, 1];
        let c: &[usize] = &[3];
        assert_eq!(broadcast_shapes([a, b, c]), Some(vec![1, 2, 1, 3]));
    }

    #[test]
    fn broadcast_mismatch() {
        let a: &[usize] = &[1, 1, 1, 3];
        let b: &[usize] = &[1, 1, 1, 4];
        assert_eq!(broadcast_shapes([a, b]), None);
    }

    #[test]
    fn broadcast_zero_length() {
        let a: &[usize] = &[0, 1];
        let b: &[usize] = &[1, 5];
        assert_eq!(broadcast_shapes([a, b]), Some(vec![0, 5]));
    }

    #[test]
    fn remove_repeat_collapses_constant_axes() {
        // constant along axes 0 and 2, varying along axis 1
        let array = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| idx[1] as f64);
        let collapsed = remove_repeat(array.view(), 1e-6);
        assert_eq!(collapsed.shape(), &[1, 3, 1]);
        assert_eq!(collapsed.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn remove_repeat_respects_tolerance() {
        let array = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![1.0, 1.0004, 0.9996]).unwrap();
        assert_eq!(remove_repeat(array.view(), 1e-3).shape(), &[1, 1]);
        assert_eq!(remove_repeat(array.view(), 1e-4).shape(), &[1, 3]);
    }

    #[test]
    fn remove_repeat_compares_values_pairwise() {
        // each value is within tol of the first, but the outer two are not
        let array = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![0.0, 0.9e-3, -0.9e-3]).unwrap();
        assert_eq!(remove_repeat(array.view(), 1e-3).shape(), &[1, 3]);
        assert_eq!(remove_repeat(array.view(), 2e-3).shape(), &[1, 1]);
    }

    #[test]
    fn remove_repeat_includes_tolerance_boundary() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 0.25, 0.5, 1.0, 1.5, 1.25])
            .unwrap();
        let collapsed = remove_repeat(array.view(), 0.5);
        assert_eq!(collapsed.shape(), &[2, 1]);
        assert_eq!(collapsed.iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0]);
        assert_eq!(remove_repeat(array.view(), 0.25).shape(), &[2, 3]);
    }

    #[test]
    fn remove_repeat_keeps_nan_lanes() {
        let array = ArrayD::from_shape_vec(IxDyn(&[1, 2]), vec![f64::NAN, f64::NAN]).unwrap();
        assert_eq!(remove_repeat(array.view(), 1e-3).shape(), &[1, 2]);
    }

    #[test]
    fn remove_repeat_never_collapses_empty_axes() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[0, 2]));
        assert_eq!(remove_repeat(array.view(), 1e-3).shape(), &[0, 1]);
    }

    #[test]
    fn summarize_short_and_long() {
        assert_eq!(summarize_values(&[1, 1, 1, 1], 7), "[1, 1, 1, 1]");
        assert_eq!(
            summarize_values(&[1, 2, 3, 4, 5, 6, 7, 8], 7),
            "[1, 2, 3, ..., 6, 7, 8]"
        );
    }
}
