//! `FromPyObject` implementations for the trajectory types.
//!
//! Gated behind the `pyo3` feature, reads the dict layout written by
//! `pyo3_wrap`. Trajectories go through the regular constructor, so all
//! shape checks apply.

use ndarray::{ArrayD, IxDyn};
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
};

use super::{Device, KArray, KTrajectory, Values};

impl FromPyObject<'_, '_> for KArray {
    type Error = PyErr;

    fn extract(obj: Borrowed<'_, '_, PyAny>) -> PyResult<Self> {
        let shape: Vec<usize> = obj.get_item("shape")?.extract()?;
        let dtype: String = obj.get_item("dtype")?.extract()?;
        let device: String = obj.get_item("device")?.extract()?;
        let device: Device = device.parse().map_err(PyValueError::new_err)?;

        let data = obj.get_item("data")?;
        let values = match dtype.as_str() {
            "float64" => Values::Float(from_shape_vec(&shape, data.extract()?)?),
            "int64" => Values::Int(from_shape_vec(&shape, data.extract()?)?),
            other => {
                return Err(PyTypeError::new_err(format!(
                    "unsupported trajectory dtype: {other}"
                )));
            }
        };
        Ok(KArray::new(values, device))
    }
}

impl FromPyObject<'_, '_> for KTrajectory {
    type Error = PyErr;

    fn extract(obj: Borrowed<'_, '_, PyAny>) -> PyResult<Self> {
        let kz: KArray = obj.get_item("kz")?.extract()?;
        let ky: KArray = obj.get_item("ky")?.extract()?;
        let kx: KArray = obj.get_item("kx")?.extract()?;
        let grid_detection_tolerance: f64 = obj.get_item("grid_detection_tolerance")?.extract()?;
        let repeat_detection_tolerance: Option<f64> =
            obj.get_item("repeat_detection_tolerance")?.extract()?;

        KTrajectory::with_tolerances(
            kz,
            ky,
            kx,
            grid_detection_tolerance,
            repeat_detection_tolerance,
        )
        .map_err(|err| PyValueError::new_err(err.to_string()))
    }
}

fn from_shape_vec<T>(shape: &[usize], data: Vec<T>) -> PyResult<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|err| PyValueError::new_err(format!("data does not match shape {shape:?}: {err}")))
}
