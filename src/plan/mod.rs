pub mod builder;
pub mod error;
pub mod file;
pub mod record;

pub use builder::PlanBuilder;
pub use error::{PlanError, Result};
pub use file::{load_plan, read_plan, save_plan, write_plan};
pub use record::{ensure_unique_modules, PlanRecord};
