mod device;
mod karray;
mod ktrajectory;
mod spatial_dimension;
mod traj_type;

#[cfg(feature = "pyo3")]
mod pyo3_extract;
#[cfg(feature = "pyo3")]
mod pyo3_wrap;

pub use device::Device;
pub use karray::{KArray, Values};
pub use ktrajectory::{
    AxesOrder, DEFAULT_GRID_DETECTION_TOLERANCE, DEFAULT_REPEAT_DETECTION_TOLERANCE,
    DEFAULT_TENSOR_REPEAT_DETECTION_TOLERANCE, FromTensorOptions, KTrajectory, Scaling,
};
pub use spatial_dimension::SpatialDimension;
pub use traj_type::TrajType;
