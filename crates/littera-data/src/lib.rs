pub mod alignment;
pub mod block;
pub mod document;
pub mod entity;
pub mod mention;
pub mod review;
pub mod section;
pub mod work;

pub use alignment::{BlockAlignmentRepository, InMemoryBlockAlignmentRepository, PgBlockAlignmentRepository};
pub use block::{BlockRepository, InMemoryBlockRepository, PgBlockRepository};
pub use document::{DocumentRepository, InMemoryDocumentRepository, PgDocumentRepository};
pub use entity::{
    EntityLabelRepository, EntityRepository, EntityWorkMetadataRepository, InMemoryEntityLabelRepository,
    InMemoryEntityRepository, InMemoryEntityWorkMetadataRepository, PgEntityLabelRepository, PgEntityRepository,
    PgEntityWorkMetadataRepository,
};
pub use mention::{InMemoryMentionRepository, MentionRepository, PgMentionRepository};
pub use review::{InMemoryReviewRepository, PgReviewRepository, ReviewRepository};
pub use section::{InMemorySectionRepository, PgSectionRepository, SectionRepository};
pub use work::{InMemoryWorkRepository, PgWorkRepository, WorkRepository};
