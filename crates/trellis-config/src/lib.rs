mod error;
mod manager;
mod model;
mod validate;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::*;
pub use validate::{validate_column, BindingClass, ColumnValidation};
