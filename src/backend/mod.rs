//! Concrete collaborators: an in-memory backend, the JSON guide file that
//! feeds it, and a seeded synthetic guide generator.

pub mod guide_file;
pub mod memory;
pub mod synthetic;

pub use guide_file::GuideFile;
pub use memory::MemoryBackend;
pub use synthetic::SyntheticGuide;
