pub mod enums;
pub mod profile;
pub mod region;
pub mod assessment;
pub mod analysis;
pub mod plan;

pub use enums::*;
pub use profile::*;
pub use region::*;
pub use assessment::*;
pub use analysis::*;
pub use plan::*;

use thiserror::Error;

/// Domain validation failures raised while constructing model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Pain intensity must be between 1 and 10 (got {0})")]
    IntensityOutOfRange(u8),
}
