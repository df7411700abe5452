//! pifive - Common Types and Utilities
//! 
//! This crate contains the error taxonomy and source location types
//! shared by the front end, the code generator and the driver.

pub mod error;
pub mod source_loc;

pub use error::CompilerError;
pub use source_loc::{SourceLocation, SourceSpan, SourceTracker};
