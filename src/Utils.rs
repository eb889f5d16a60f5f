//! # Utils
//!
//! ## Aim
//! Small helpers around a run: reading a case file and setting up logging.
//!
//! ## Main Data Structures and Logic
//! - `load_from_file`: `load_config_from_file` reads a `SystemConfig` either from a bare
//!   JSON document or from the section under a `SYSTEM` header of a multi-section case file
//!   (a section ends at the next line written in capitals). Parse errors are logged with
//!   the line and a caret under the offending column.
//! - `logger`: `init_logger` installs a `simplelog` terminal logger.
pub mod load_from_file;
pub mod logger;
pub use load_from_file::{LoadData, load_config_from_file};
pub use logger::init_logger;
