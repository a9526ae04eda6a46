//! Domain model for plans, tasks and connection endpoints.

mod binding;
mod endpoint;
mod error;
mod plan;
mod task;

pub use binding::ServiceBinding;
pub use endpoint::{ConnectionEndpoint, TaskEndpoint};
pub use error::{PlanError, PlanResult};
pub use plan::Plan;
pub use task::Task;
