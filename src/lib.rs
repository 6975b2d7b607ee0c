pub mod actions;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod ingest;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod synthetic;
pub mod table;
pub mod valuation;
pub mod window;

pub use actions::{Action, ActionResult, ActionType, BodyPart};
pub use config::{OrderingPolicy, Pitch, PipelineConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{Dataset, RowKey, build_dataset};
pub use table::ActionTable;
pub use valuation::{ActionValue, ProbabilityRow, value_actions};
