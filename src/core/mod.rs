pub mod data;
pub mod discretized;
pub mod errors;
pub mod filter_codec;
pub mod frame;
pub mod matrix;

pub use data::*; // Re-export common data types
pub use discretized::DiscretizedData;
pub use errors::*;
pub use frame::{ColumnValues, Frame};
pub use matrix::{CsrMatrix, EncodedMatrix};
