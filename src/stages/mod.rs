pub mod stage0_fetch;
pub mod stage1_normalize;
pub mod stage2_reshape_join;
pub mod stage3_persist;

pub use stage0_fetch::*;
pub use stage1_normalize::*;
pub use stage2_reshape_join::*;
pub use stage3_persist::*;
