//! funcgraph - static call-graph extraction for Azure Functions projects
//!
//! Given a project location (a local path or a git URL), funcgraph discovers every
//! function of the app, reads its declared bindings and infers which functions start,
//! call, signal or continue which others. JavaScript, TypeScript and Python projects
//! are read as they are; .NET projects are published first so that every runtime
//! ends up with the same per-function folder layout.
//!
//! Matching is heuristic: regular expressions over source text, not a compiler front
//! end. False positives and negatives are expected.
//!
//! # Example Usage
//!
//! ```no_run
//! use funcgraph::{
//!     traverse, CancellationFlag, FuncGraphConfig, LoggingHandler, TempResourceTracker,
//!     TraversalContext,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FuncGraphConfig::default();
//! let tracker = TempResourceTracker::new(&config.temp_dir);
//! let cancel = CancellationFlag::new();
//! let ctx = TraversalContext {
//!     config: &config,
//!     tracker: &tracker,
//!     progress: &LoggingHandler,
//!     cancel: &cancel,
//! };
//!
//! let result = traverse(&ctx, "https://github.com/org/repo/tree/main/app").await;
//! tracker.cleanup();
//!
//! for function in result?.functions.iter() {
//!     println!("{} <- {:?}", function.name, function.is_called_by);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`locator`]: path/URL resolution, cloning and `host.json` search
//! - [`runtime`]: runtime detection and .NET publish staging
//! - [`catalog`]: `function.json` enumeration
//! - [`source`]: source lookup and the bracket-depth scanner
//! - [`matcher`]: call, signal and continue-as-new detection
//! - [`bindings`]: .NET attribute binding recovery
//! - [`diagram`]: Mermaid rendering
//! - [`traversal`]: the driver, temp folder tracking and cancellation

pub mod bindings;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod functions;
pub mod locator;
pub mod matcher;
pub mod process;
pub mod progress;
pub mod runtime;
pub mod source;
pub mod traversal;
pub mod util;

pub use config::{ConfigError, FuncGraphConfig};
pub use diagram::diagram_code;
pub use functions::{
    BindingDescriptor, Direction, FunctionRecord, FunctionsMap, SignalRef, TraversalResult,
    TriggerKind,
};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use runtime::RuntimeKind;
pub use traversal::{
    traverse, CancellationFlag, TempResourceTracker, TraversalContext, TraversalError,
};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
