//! Bundles every repository a command needs so `*Commands` methods take one
//! argument instead of eight.

use std::sync::Arc;

use littera_data::{
    BlockAlignmentRepository, BlockRepository, DocumentRepository, EntityLabelRepository, EntityRepository,
    EntityWorkMetadataRepository, MentionRepository, ReviewRepository, SectionRepository, WorkRepository,
};

#[derive(Clone)]
pub struct Workspace {
    pub works: Arc<dyn WorkRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub sections: Arc<dyn SectionRepository>,
    pub blocks: Arc<dyn BlockRepository>,
    pub entities: Arc<dyn EntityRepository>,
    pub labels: Arc<dyn EntityLabelRepository>,
    pub work_metadata: Arc<dyn EntityWorkMetadataRepository>,
    pub mentions: Arc<dyn MentionRepository>,
    pub alignments: Arc<dyn BlockAlignmentRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}
