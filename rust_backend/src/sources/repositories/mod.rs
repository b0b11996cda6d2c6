//! Repository implementations.
//!
//! - [`LocalRepository`]: in-memory, for tests and offline development
//! - [`FilesRepository`]: fixture files plus the upstream queue API

pub mod files;
pub mod local;

pub use files::FilesRepository;
pub use local::LocalRepository;
