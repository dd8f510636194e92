pub mod clock;
pub mod config;
pub mod context;
pub mod errors;
pub mod greeting;
pub mod registry;
pub mod service;
pub mod telemetry;

pub use config::{FunctionConfig, load_config};
pub use context::{FunctionContext, StaticContext};
pub use errors::{FunctionError, Result};
pub use registry::FunctionRegistry;
pub use service::{FunctionService, run_service};
