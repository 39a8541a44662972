use std::fmt::Display;
use std::str::FromStr;

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Device, KArray, SpatialDimension, TrajType, Values};
use crate::error::{ShapeError, TrajectoryError, ValidationError};
use crate::utils::{broadcast_shapes, summarize_values};

pub const DEFAULT_GRID_DETECTION_TOLERANCE: f64 = 1e-3;
pub const DEFAULT_REPEAT_DETECTION_TOLERANCE: f64 = 1e-3;
/// Repeat tolerance used when reading stacked tensors.
pub const DEFAULT_TENSOR_REPEAT_DETECTION_TOLERANCE: f64 = 1e-6;

/// Below this extent, a component is treated as a single encoding point when rescaling.
const MIN_RESCALE_RANGE: f64 = 1e-6;
const MIN_RANK: usize = 4;

/// K-space trajectory.
///
/// Contains the trajectory in k-space along the three dimensions `kz`, `ky`,
/// `kx`, i.e. describes where in k-space each data point was acquired.
///
/// The shape of each of `kz`, `ky`, `kx` is `(*other, k2, k1, k0)`, where
/// `other` can span multiple dimensions. The three arrays only have to be
/// broadcastable to each other: a 2D Cartesian trajectory has `kx` changing
/// along `k0`, `ky` changing along `k1` and `kz` of shape `(1, 1, 1, 1)`.
///
/// A trajectory can not be modified after construction. Transformations like
/// [`KTrajectory::to_device`] return a new instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryRecord", into = "TrajectoryRecord")]
pub struct KTrajectory {
    kz: KArray,
    ky: KArray,
    kx: KArray,
    grid_detection_tolerance: f64,
    repeat_detection_tolerance: Option<f64>,
}

impl KTrajectory {
    /// Create a trajectory with default tolerances.
    ///
    /// Axes along which a component is constant (up to
    /// [`DEFAULT_REPEAT_DETECTION_TOLERANCE`]) are reduced to length 1.
    pub fn new(
        kz: impl Into<KArray>,
        ky: impl Into<KArray>,
        kx: impl Into<KArray>,
    ) -> Result<Self, TrajectoryError> {
        Self::with_tolerances(
            kz,
            ky,
            kx,
            DEFAULT_GRID_DETECTION_TOLERANCE,
            Some(DEFAULT_REPEAT_DETECTION_TOLERANCE),
        )
    }

    /// Create a trajectory.
    ///
    /// - `grid_detection_tolerance`: how close positions have to be to integer
    ///   grid points to be considered on the grid
    /// - `repeat_detection_tolerance`: values differing by less than this are
    ///   treated as repeats and their axis is collapsed. `None` disables this.
    ///
    /// Fails if the three arrays can not be broadcast together, if the
    /// broadcasted shape has less than 4 dimensions or if they are placed on
    /// different devices.
    pub fn with_tolerances(
        kz: impl Into<KArray>,
        ky: impl Into<KArray>,
        kx: impl Into<KArray>,
        grid_detection_tolerance: f64,
        repeat_detection_tolerance: Option<f64>,
    ) -> Result<Self, TrajectoryError> {
        let components: [KArray; 3] = [kz.into(), ky.into(), kx.into()];
        let [kz, ky, kx] = components.map(|k| match repeat_detection_tolerance {
            Some(tolerance) => collapse_repeats(k, tolerance),
            None => k,
        });

        let shape = broadcasted_shape(&kz, &ky, &kx)?;
        if shape.len() < MIN_RANK {
            return Err(ShapeError::InsufficientRank { rank: shape.len() }.into());
        }

        let devices = [kz.device(), ky.device(), kx.device()];
        if devices.iter().any(|&d| d != devices[0]) {
            return Err(TrajectoryError::DeviceMismatch(devices));
        }

        Ok(Self {
            kz,
            ky,
            kx,
            grid_detection_tolerance,
            repeat_detection_tolerance,
        })
    }

    /// Create a trajectory from a tensor with `kz`, `ky`, `kx` stacked along one axis.
    ///
    /// The components are read in `options.axes_order` from the stack axis,
    /// optionally rescaled to span the given matrix, and passed on to
    /// [`KTrajectory::with_tolerances`]. The grid tolerance applies after
    /// rescaling.
    pub fn from_tensor(
        tensor: impl Into<KArray>,
        options: &FromTensorOptions,
    ) -> Result<Self, TrajectoryError> {
        let tensor = tensor.into();
        let axis = normalize_axis(options.stack_dim, tensor.ndim())?;
        let found = tensor.len_of(axis);
        if found != 3 {
            return Err(ValidationError::StackLength { found }.into());
        }

        let [kz, ky, kx] = options
            .axes_order
            .positions()
            .map(|index| tensor.index_axis(axis, index));

        let [kz, ky, kx] = match &options.scaling {
            Scaling::None => [kz, ky, kx],
            Scaling::Matrix(matrix) => [(kz, matrix.z), (ky, matrix.y), (kx, matrix.x)]
                .map(|(k, size)| rescale(&k, size)),
        };

        Self::with_tolerances(
            kz,
            ky,
            kx,
            options.grid_detection_tolerance,
            options.repeat_detection_tolerance,
        )
    }

    pub fn kz(&self) -> &KArray {
        &self.kz
    }

    pub fn ky(&self) -> &KArray {
        &self.ky
    }

    pub fn kx(&self) -> &KArray {
        &self.kx
    }

    /// The components in `(kz, ky, kx)` order.
    pub fn components(&self) -> [&KArray; 3] {
        [&self.kz, &self.ky, &self.kx]
    }

    pub fn grid_detection_tolerance(&self) -> f64 {
        self.grid_detection_tolerance
    }

    pub fn repeat_detection_tolerance(&self) -> Option<f64> {
        self.repeat_detection_tolerance
    }

    /// The common shape all three components broadcast to.
    pub fn broadcasted_shape(&self) -> Vec<usize> {
        // validated on construction
        broadcasted_shape(&self.kz, &self.ky, &self.kx).unwrap_or_default()
    }

    /// Type of trajectory along kz, ky, kx.
    pub fn type_along_kzyx(&self) -> [TrajType; 3] {
        self.traj_types(self.grid_detection_tolerance).0
    }

    /// Type of trajectory along k2, k1, k0.
    pub fn type_along_k210(&self) -> [TrajType; 3] {
        self.traj_types(self.grid_detection_tolerance).1
    }

    /// Calculate the trajectory type along kz, ky, kx and along k2, k1, k0.
    ///
    /// For every component and each of its three encoding axes, the axis is
    /// - [`TrajType::SINGLEVALUE`] (and [`TrajType::ONGRID`]) if it has length 1
    /// - [`TrajType::ONGRID`] if all values of the component lie within
    ///   `tolerance` of integer positions
    ///
    /// The type along a component (or axis) contains only the flags set for
    /// all axes of that component (or all components along that axis).
    pub fn traj_types(&self, tolerance: f64) -> ([TrajType; 3], [TrajType; 3]) {
        // TODO: detect regular grids with non-integer spacing, e.g. (0.5, 1, 1.5, ...)
        let mut matrix = [[TrajType::ARBITRARY; 3]; 3];
        for (row, k) in matrix.iter_mut().zip(self.components()) {
            let values_on_grid = k.all_on_grid(tolerance);
            for (cell, len) in row.iter_mut().zip(encoding_lengths(k.shape())) {
                if len == 1 {
                    *cell |= TrajType::SINGLEVALUE | TrajType::ONGRID;
                }
                if values_on_grid {
                    *cell |= TrajType::ONGRID;
                }
            }
        }
        trace!(?matrix, "trajectory type matrix (kzyx x k210)");

        let type_kzyx = matrix.map(TrajType::common);
        let type_k210 = [0, 1, 2].map(|col| TrajType::common(matrix.iter().map(|row| row[col])));
        (type_kzyx, type_k210)
    }

    /// Tensor representation of the trajectory.
    ///
    /// All components are expanded to [`KTrajectory::broadcasted_shape`] and
    /// stacked in `(kz, ky, kx)` order along a new axis at `stack_dim`, which
    /// may be negative to count from the end. The result holds integers only if
    /// all three components do.
    pub fn as_tensor(&self, stack_dim: isize) -> Result<KArray, TrajectoryError> {
        let shape = self.broadcasted_shape();
        let axis = normalize_axis(stack_dim, shape.len() + 1)?;

        let values = match self.components().map(|k| k.values()) {
            [Values::Int(z), Values::Int(y), Values::Int(x)] => {
                Values::Int(stack_expanded([z.view(), y.view(), x.view()], &shape, axis)?)
            }
            _ => {
                let [z, y, x] = self.components().map(|k| k.as_f64());
                Values::Float(stack_expanded([z.view(), y.view(), x.view()], &shape, axis)?)
            }
        };
        Ok(KArray::new(values, self.device()))
    }

    /// The device all components are placed on.
    pub fn device(&self) -> Device {
        self.kz.device()
    }

    /// Copy of this trajectory with all three components moved to `device`.
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            kz: self.kz.to_device(device),
            ky: self.ky.to_device(device),
            kx: self.kx.to_device(device),
            ..*self
        }
    }

    pub fn cpu(&self) -> Self {
        self.to_device(Device::Cpu)
    }

    pub fn cuda(&self, index: u32) -> Self {
        self.to_device(Device::Cuda(index))
    }
}

impl Display for KTrajectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [z, y, x] = self.components().map(|k| summarize_values(k.shape(), 7));
        write!(f, "KTrajectory with shape: kz={z}, ky={y}, kx={x}")
    }
}

fn collapse_repeats(k: KArray, tolerance: f64) -> KArray {
    let collapsed = k.remove_repeat(tolerance);
    if collapsed.shape() != k.shape() {
        debug!(
            from = ?k.shape(),
            to = ?collapsed.shape(),
            "collapsed repeated trajectory axes"
        );
    }
    collapsed
}

fn broadcasted_shape(kz: &KArray, ky: &KArray, kx: &KArray) -> Result<Vec<usize>, ShapeError> {
    broadcast_shapes([kz.shape(), ky.shape(), kx.shape()]).ok_or_else(|| {
        ShapeError::NotBroadcastable {
            shapes: vec![kz.shape().to_vec(), ky.shape().to_vec(), kx.shape().to_vec()],
        }
    })
}

/// Lengths of the three innermost (k2, k1, k0) axes, 1 where the array has
/// fewer dimensions.
fn encoding_lengths(shape: &[usize]) -> [usize; 3] {
    let mut lengths = [1; 3];
    let n = shape.len().min(3);
    lengths[3 - n..].copy_from_slice(&shape[shape.len() - n..]);
    lengths
}

fn normalize_axis(dim: isize, ndim: usize) -> Result<Axis, ValidationError> {
    let resolved = if dim < 0 { dim + ndim as isize } else { dim };
    if (0..ndim as isize).contains(&resolved) {
        Ok(Axis(resolved as usize))
    } else {
        Err(ValidationError::StackDimOutOfRange { dim, ndim })
    }
}

fn stack_expanded<A: Clone>(
    arrays: [ArrayViewD<'_, A>; 3],
    shape: &[usize],
    axis: Axis,
) -> Result<ArrayD<A>, ShapeError> {
    let not_broadcastable = || ShapeError::NotBroadcastable {
        shapes: arrays.iter().map(|a| a.shape().to_vec()).collect(),
    };
    let expanded = arrays
        .iter()
        .map(|a| a.broadcast(IxDyn(shape)).ok_or_else(not_broadcastable))
        .collect::<Result<Vec<_>, _>>()?;
    ndarray::stack(axis, &expanded).map_err(|_| not_broadcastable())
}

/// Scale `k` so that its extremal values span `[-size / 2, size / 2]`.
///
/// A single encoding point (`size < 2`) or a component without extent is
/// placed at zero.
fn rescale(k: &KArray, size: f64) -> KArray {
    let max_abs_range = 2.0 * k.max_abs();
    if size < 2.0 || max_abs_range < MIN_RESCALE_RANGE {
        debug!(size, max_abs_range, "trajectory component rescaled to zero");
        return k.zeros_like();
    }
    k.scaled(size / max_abs_range)
}

// ==============================
// Options for stacked conversion
// ==============================

/// Order in which the `z`, `y`, `x` components are stacked in a tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxesOrder {
    #[default]
    Zyx,
    Zxy,
    Yxz,
    Yzx,
    Xyz,
    Xzy,
}

impl AxesOrder {
    pub const ALL: [AxesOrder; 6] = [
        AxesOrder::Zyx,
        AxesOrder::Zxy,
        AxesOrder::Yxz,
        AxesOrder::Yzx,
        AxesOrder::Xyz,
        AxesOrder::Xzy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AxesOrder::Zyx => "zyx",
            AxesOrder::Zxy => "zxy",
            AxesOrder::Yxz => "yxz",
            AxesOrder::Yzx => "yzx",
            AxesOrder::Xyz => "xyz",
            AxesOrder::Xzy => "xzy",
        }
    }

    /// Position of the `z`, `y` and `x` component along the stack axis.
    pub fn positions(&self) -> [usize; 3] {
        match self {
            AxesOrder::Zyx => [0, 1, 2],
            AxesOrder::Zxy => [0, 2, 1],
            AxesOrder::Yxz => [2, 0, 1],
            AxesOrder::Yzx => [1, 0, 2],
            AxesOrder::Xyz => [2, 1, 0],
            AxesOrder::Xzy => [1, 2, 0],
        }
    }
}

impl FromStr for AxesOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| ValidationError::AxesOrder(s.to_string()))
    }
}

impl Display for AxesOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional rescaling of a trajectory to an encoding matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Scaling {
    /// Keep the trajectory values unchanged.
    #[default]
    None,
    /// Rescale each component to span `[-size / 2, size / 2]` of the matrix size.
    Matrix(SpatialDimension<f64>),
}

/// Parameters of [`KTrajectory::from_tensor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FromTensorOptions {
    /// Axis along which the components are stacked, negative counts from the end.
    pub stack_dim: isize,
    pub axes_order: AxesOrder,
    pub repeat_detection_tolerance: Option<f64>,
    pub grid_detection_tolerance: f64,
    pub scaling: Scaling,
}

impl Default for FromTensorOptions {
    fn default() -> Self {
        Self {
            stack_dim: 0,
            axes_order: AxesOrder::Zyx,
            repeat_detection_tolerance: Some(DEFAULT_TENSOR_REPEAT_DETECTION_TOLERANCE),
            grid_detection_tolerance: DEFAULT_GRID_DETECTION_TOLERANCE,
            scaling: Scaling::None,
        }
    }
}

// =============
// Serialization
// =============

/// Unvalidated field record, deserialized trajectories are rebuilt from it.
#[derive(Serialize, Deserialize)]
struct TrajectoryRecord {
    kz: KArray,
    ky: KArray,
    kx: KArray,
    grid_detection_tolerance: f64,
    repeat_detection_tolerance: Option<f64>,
}

impl TryFrom<TrajectoryRecord> for KTrajectory {
    type Error = TrajectoryError;

    fn try_from(record: TrajectoryRecord) -> Result<Self, Self::Error> {
        Self::with_tolerances(
            record.kz,
            record.ky,
            record.kx,
            record.grid_detection_tolerance,
            record.repeat_detection_tolerance,
        )
    }
}

impl From<KTrajectory> for TrajectoryRecord {
    fn from(traj: KTrajectory) -> Self {
        Self {
            kz: traj.kz,
            ky: traj.ky,
            kx: traj.kx,
            grid_detection_tolerance: traj.grid_detection_tolerance,
            repeat_detection_tolerance: traj.repeat_detection_tolerance,
        }
    }
}
