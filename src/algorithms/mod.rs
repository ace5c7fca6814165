pub mod bin_labels;
pub mod tabular;
pub mod token_sets;

pub use bin_labels::represent_bin;
pub use tabular::{discretize_data, spec_from_json, ColumnRule, CustomEncoder, DiscretizationSpec};
pub use token_sets::{discretize_token_sets, TokenSetOptions};
