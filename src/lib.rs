// src/lib.rs

//! `slice_discretize` turns tabular data and token sets into compact
//! integer-coded datasets for combinatorial slice search, and translates
//! slices and filters between encoded codes and human-readable labels.
//!
//! ```no_run
//! use slice_discretize::{discretize_data, ColumnRule, DiscretizationSpec, Frame, Result};
//!
//! fn example() -> Result<()> {
//!     let frame = Frame::new()
//!         .with_column("age", vec![23.0, 41.0, 67.0])?
//!         .with_column("city", vec!["Oslo", "Lima", "Oslo"])?;
//!     let spec: DiscretizationSpec = [
//!         ("age".to_string(), ColumnRule::bins(vec![30.0, 50.0])),
//!         ("city".to_string(), ColumnRule::unique()),
//!     ]
//!     .into_iter()
//!     .collect();
//!     let data = discretize_data(&frame, &spec)?;
//!     println!("{:?}", data.decode_row(0)?);
//!     Ok(())
//! }
//! ```

pub mod algorithms;
pub mod core;
pub mod filters;
pub mod slices;
pub mod traits;
pub mod utils;

// Re-export key components for easier use by library consumers
pub use crate::algorithms::{
    discretize_data, discretize_token_sets, spec_from_json, ColumnRule, DiscretizationSpec,
    TokenSetOptions,
};
pub use crate::core::{
    Code, ColumnDescription, ColumnKey, ColumnValues, DiscretizeError, DiscretizedData,
    EncodedMatrix, Frame, Label, LabelMap, Result,
};
pub use crate::filters::{DecodedFilter, EncodedFilter, SliceFilter};
pub use crate::slices::{EncodedSlice, Slice, SliceDescription, SliceFeature};
pub use crate::traits::{ColumnEncoder, EncodedColumn};
