pub mod logging;

pub use logging::{init_logging, truncate_chars};
