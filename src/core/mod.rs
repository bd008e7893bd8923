pub mod config_manager;
pub mod updatable;

pub use config_manager::{ConfigFileError, ConfigurationManager};
pub use updatable::Updatable;
