//! k-space trajectories for MRI reconstruction.
//!
//! The central type is [`KTrajectory`], an immutable description of where in
//! k-space each sample was acquired. Its three coordinate arrays `kz`, `ky`,
//! `kx` are shaped `(*other, k2, k1, k0)` and only need to be broadcastable to
//! each other: axes along which a coordinate does not change are stored with
//! length 1.
//!
//! ```
//! use ktrajectory::{KArray, KTrajectory, TrajType};
//! use ndarray::{ArrayD, IxDyn};
//!
//! // 2D Cartesian: kx changes along k0, ky along k1, kz is a single point
//! let kx = ArrayD::from_shape_fn(IxDyn(&[1, 1, 4, 8]), |idx| idx[3] as f64 - 4.0);
//! let ky = ArrayD::from_shape_fn(IxDyn(&[1, 1, 4, 8]), |idx| idx[2] as f64 - 2.0);
//! let kz = KArray::full(&[1, 1, 1, 1], 0.0);
//!
//! let traj = KTrajectory::new(kz, ky, kx)?;
//! assert_eq!(traj.kx().shape(), &[1, 1, 1, 8]);
//! assert_eq!(traj.broadcasted_shape(), vec![1, 1, 4, 8]);
//! assert!(traj.type_along_k210()[2].contains(TrajType::ONGRID));
//! # Ok::<(), ktrajectory::TrajectoryError>(())
//! ```

mod error;

// =====================================
// Public API of ktrajectory
// =====================================

pub mod codec;
pub mod data;
pub mod models;
pub mod utils;

pub use data::{
    AxesOrder, Device, FromTensorOptions, KArray, KTrajectory, Scaling, SpatialDimension,
    TrajType, Values,
};
pub use error::*;
