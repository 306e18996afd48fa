pub mod gdp;
pub mod indicator;
pub mod reference;

pub use gdp::*;
pub use indicator::*;
pub use reference::*;
