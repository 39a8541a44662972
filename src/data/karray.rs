use ndarray::{Array, ArrayD, Axis, CowArray, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use super::Device;
use crate::utils;

/// Element storage of a [`KArray`].
///
/// Integer coordinates are kept as integers so that they can be recognized as
/// lying on the sampling grid without any tolerance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Values {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
}

/// An n-dimensional array of k-space coordinates placed on a [`Device`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KArray {
    values: Values,
    device: Device,
}

impl KArray {
    pub fn new(values: Values, device: Device) -> Self {
        Self { values, device }
    }

    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>) -> Result<Self, ndarray::ShapeError> {
        Ok(ArrayD::from_shape_vec(IxDyn(shape), data)?.into())
    }

    /// Array of the given shape where every element is `value`.
    pub fn full(shape: &[usize], value: f64) -> Self {
        ArrayD::from_elem(IxDyn(shape), value).into()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn shape(&self) -> &[usize] {
        match &self.values {
            Values::Float(a) => a.shape(),
            Values::Int(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self.values, Values::Float(_))
    }

    /// Floating point view of the values, converting integers if required.
    pub fn as_f64(&self) -> CowArray<'_, f64, IxDyn> {
        match &self.values {
            Values::Float(a) => a.view().into(),
            Values::Int(a) => a.mapv(|v| v as f64).into(),
        }
    }

    /// Same array with floating point storage.
    pub fn into_float(self) -> Self {
        match self.values {
            Values::Float(_) => self,
            Values::Int(a) => Self {
                values: Values::Float(a.mapv(|v| v as f64)),
                device: self.device,
            },
        }
    }

    /// Largest absolute value, 0 for empty arrays.
    pub fn max_abs(&self) -> f64 {
        match &self.values {
            Values::Float(a) => a.iter().fold(0.0, |acc: f64, v| acc.max(v.abs())),
            Values::Int(a) => a.iter().fold(0.0, |acc: f64, v| acc.max(v.unsigned_abs() as f64)),
        }
    }

    /// Whether every value is within `tolerance` of an integer.
    ///
    /// Integer arrays are on the grid by definition.
    pub fn all_on_grid(&self, tolerance: f64) -> bool {
        match &self.values {
            Values::Float(a) => a.iter().all(|v| (v - v.round()).abs() <= tolerance),
            Values::Int(_) => true,
        }
    }

    /// Collapse repeated axes to length 1, see [`utils::remove_repeat`].
    ///
    /// The result always has floating point storage.
    pub fn remove_repeat(&self, tolerance: f64) -> Self {
        Self {
            values: Values::Float(utils::remove_repeat(self.as_f64().view(), tolerance)),
            device: self.device,
        }
    }

    pub(crate) fn len_of(&self, axis: Axis) -> usize {
        self.shape()[axis.index()]
    }

    /// Sub-array at `index` along `axis`, with that axis removed.
    pub(crate) fn index_axis(&self, axis: Axis, index: usize) -> Self {
        let values = match &self.values {
            Values::Float(a) => Values::Float(a.index_axis(axis, index).to_owned()),
            Values::Int(a) => Values::Int(a.index_axis(axis, index).to_owned()),
        };
        Self {
            values,
            device: self.device,
        }
    }

    pub fn zeros_like(&self) -> Self {
        let values = match &self.values {
            Values::Float(a) => Values::Float(ArrayD::zeros(a.raw_dim())),
            Values::Int(a) => Values::Int(ArrayD::zeros(a.raw_dim())),
        };
        Self {
            values,
            device: self.device,
        }
    }

    /// Multiply all values by `factor`. The result is floating point.
    pub fn scaled(&self, factor: f64) -> Self {
        let values = match &self.values {
            Values::Float(a) => a * factor,
            Values::Int(a) => a.mapv(|v| v as f64 * factor),
        };
        Self {
            values: Values::Float(values),
            device: self.device,
        }
    }

    pub fn to_device(&self, device: Device) -> Self {
        Self {
            values: self.values.clone(),
            device,
        }
    }
}

impl<D: Dimension> From<Array<f64, D>> for KArray {
    fn from(value: Array<f64, D>) -> Self {
        Self::new(Values::Float(value.into_dyn()), Device::Cpu)
    }
}

impl<D: Dimension> From<Array<i64, D>> for KArray {
    fn from(value: Array<i64, D>) -> Self {
        Self::new(Values::Int(value.into_dyn()), Device::Cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn integer_arrays_are_on_grid() {
        let k: KArray = Array4::<i64>::from_elem((1, 1, 1, 5), 3).into();
        assert!(!k.is_floating_point());
        assert!(k.all_on_grid(0.0));
    }

    #[test]
    fn float_grid_detection_uses_tolerance() {
        let k = KArray::from_shape_vec(&[1, 1, 1, 3], vec![1.0, 2.0005, -3.0]).unwrap();
        assert!(k.all_on_grid(1e-3));
        assert!(!k.all_on_grid(1e-4));
    }

    #[test]
    fn max_abs_of_mixed_signs() {
        let k = KArray::from_shape_vec(&[1, 1, 1, 3], vec![1.0, -4.5, 2.0]).unwrap();
        assert_eq!(k.max_abs(), 4.5);
        let k: KArray = Array4::from_shape_vec((1, 1, 1, 2), vec![1_i64, -7]).unwrap().into();
        assert_eq!(k.max_abs(), 7.0);
        assert_eq!(KArray::full(&[1, 1, 0, 1], 1.0).max_abs(), 0.0);
    }

    #[test]
    fn into_float_keeps_shape_and_device() {
        let k: KArray = Array4::from_shape_vec((1, 1, 2, 3), vec![0_i64, 1, 2, 3, 4, -5])
            .unwrap()
            .into();
        let k = k.to_device(Device::Cuda(0));
        assert_eq!(k.len(), 6);
        assert!(!k.is_empty());

        let float = k.into_float();
        assert!(float.is_floating_point());
        assert!(float.device().is_cuda());
        assert_eq!(float.shape(), &[1, 1, 2, 3]);
        assert_eq!(
            float.as_f64().iter().copied().collect::<Vec<_>>(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, -5.0]
        );
        assert!(KArray::full(&[1, 0, 1, 1], 0.0).is_empty());
    }

    #[test]
    fn remove_repeat_converts_to_float() {
        let k: KArray = Array4::<i64>::from_elem((1, 2, 1, 3), 2).into();
        let collapsed = k.remove_repeat(1e-6);
        assert!(collapsed.is_floating_point());
        assert_eq!(collapsed.shape(), &[1, 1, 1, 1]);
    }

    #[test]
    fn zeros_like_keeps_dtype_and_device() {
        let k = KArray::full(&[1, 1, 2, 3], 4.0).to_device(Device::Cuda(1));
        let zeros = k.zeros_like();
        assert_eq!(zeros.shape(), k.shape());
        assert_eq!(zeros.device(), Device::Cuda(1));
        assert_eq!(zeros.max_abs(), 0.0);

        let k: KArray = Array4::<i64>::from_elem((1, 1, 1, 2), 5).into();
        assert!(!k.zeros_like().is_floating_point());
    }
}
