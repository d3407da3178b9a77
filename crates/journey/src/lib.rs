//! Journey store adapters — file-backed and synthetic touchpoint feeds with
//! date-window filtering, feeding the attribution engine.

pub mod file;
pub mod mock;
pub mod source;

pub use file::FileSource;
pub use mock::MockSource;
pub use source::{DateWindow, JourneySource};
