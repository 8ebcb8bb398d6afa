pub mod path;
pub mod result;
pub mod status;

// Re-export commonly used items at the crate root.
pub use result::{make_error, make_error_msg, Result};
pub use status::{Status, StatusCode};
