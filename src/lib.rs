pub mod config;
pub mod error;
pub mod frame;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod stages;
pub mod transform;

pub use config::{IndicatorRole, IndicatorSpec, PipelineConfig};
pub use error::PipelineError;
pub use models::{IndicatorRecord, WideGdpTable};
pub use pipeline::{PipelineOutputs, run, transform};
pub use sources::SourceClient;
pub use stages::{
    NormalizeConfig, RawSources, Stage3Config, execute_stage0, execute_stage1, execute_stage2,
    execute_stage3,
};
