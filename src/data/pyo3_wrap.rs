//! `IntoPyObject` implementations for the trajectory types.
//!
//! Gated behind the `pyo3` feature. Arrays are passed as plain dicts
//! `{"shape": [...], "data": [...], "dtype": ..., "device": ...}` with the data
//! flattened in row-major order, so no numpy dependency is required.

use pyo3::{IntoPyObjectExt, prelude::*, types::PyDict};

use super::{KArray, KTrajectory, TrajType, Values};

impl<'py> IntoPyObject<'py> for TrajType {
    type Target = PyAny;
    type Output = Bound<'py, PyAny>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> PyResult<Self::Output> {
        self.bits().into_bound_py_any(py)
    }
}

impl<'py> IntoPyObject<'py> for &KArray {
    type Target = PyDict;
    type Output = Bound<'py, PyDict>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> PyResult<Self::Output> {
        let dict = PyDict::new(py);
        dict.set_item("shape", self.shape().to_vec())?;
        match self.values() {
            Values::Float(a) => {
                dict.set_item("dtype", "float64")?;
                dict.set_item("data", a.iter().copied().collect::<Vec<f64>>())?;
            }
            Values::Int(a) => {
                dict.set_item("dtype", "int64")?;
                dict.set_item("data", a.iter().copied().collect::<Vec<i64>>())?;
            }
        }
        dict.set_item("device", self.device().to_string())?;
        Ok(dict)
    }
}

impl<'py> IntoPyObject<'py> for KTrajectory {
    type Target = PyDict;
    type Output = Bound<'py, PyDict>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> PyResult<Self::Output> {
        let dict = PyDict::new(py);
        dict.set_item("kz", self.kz().into_pyobject(py)?)?;
        dict.set_item("ky", self.ky().into_pyobject(py)?)?;
        dict.set_item("kx", self.kx().into_pyobject(py)?)?;
        dict.set_item("grid_detection_tolerance", self.grid_detection_tolerance())?;
        dict.set_item(
            "repeat_detection_tolerance",
            self.repeat_detection_tolerance(),
        )?;
        Ok(dict)
    }
}
