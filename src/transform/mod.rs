pub mod constant_columns;
pub mod join;
pub mod labels;
pub mod reshape;

pub use constant_columns::*;
pub use join::*;
pub use labels::*;
pub use reshape::*;
