//! Signal models mapping quantitative tissue parameters to MR signals.

mod wasabiti;

pub use wasabiti::{Wasabiti, WasabitiConfig};
