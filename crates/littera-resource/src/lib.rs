//! Uniform front-end surface over `littera-data`'s repositories, plus the
//! handful of operations (batched Block updates, alignment gap reports, a
//! cluster status probe) that don't fit any single noun's CRUD shape.

pub mod ops;
pub mod resource;

#[cfg(feature = "http")]
pub mod http;

pub use ops::{alignment_gaps_report, batch_update_blocks, status_probe};
pub use resource::{DocumentResource, Resource, SectionResource, StatusProbe, WorkResource};
