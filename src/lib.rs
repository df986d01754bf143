mod error;
pub mod quantiles;

pub use error::{QuantileError, QuantileResult};
