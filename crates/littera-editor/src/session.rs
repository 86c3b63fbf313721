//! Editing session: tracks which Containers have changed since the last
//! save and batches the difference into one write.

use std::collections::HashSet;
use std::rc::Rc;

use chrono::Utc;
use littera_core::{Block, Result};
use littera_data::BlockRepository;
use uuid::Uuid;

use crate::markdown::serialize_nodes;
use crate::model::Container;

/// Classification of how a Container changed between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerDelta {
    Created(Uuid),
    Updated(Uuid),
    Deleted(Uuid),
}

/// Owns a document's saved and in-progress states and computes the minimal
/// set of changes a save needs to apply.
///
/// Diffing goes through three tiers, cheapest first: `Rc::ptr_eq` (clean,
/// no further work), `block_id` set membership (create/delete), and a full
/// `PartialEq` on the remaining shared ids (update). A Container whose
/// pointer is unchanged is never re-examined by the later tiers.
#[derive(Debug, Default)]
pub struct EditorSession {
    saved: Vec<Rc<Container>>,
    current: Vec<Rc<Container>>,
}

impl EditorSession {
    pub fn new(containers: Vec<Rc<Container>>) -> Self {
        Self {
            saved: containers.clone(),
            current: containers,
        }
    }

    pub fn current(&self) -> &[Rc<Container>] {
        &self.current
    }

    pub fn set_current(&mut self, containers: Vec<Rc<Container>>) {
        self.current = containers;
    }

    pub fn is_dirty(&self) -> bool {
        !self.diff().is_empty()
    }

    /// Computes the set of changes between `saved` and `current`.
    pub fn diff(&self) -> Vec<ContainerDelta> {
        let saved_ids: HashSet<Uuid> = self.saved.iter().map(|c| c.block_id).collect();
        let current_ids: HashSet<Uuid> = self.current.iter().map(|c| c.block_id).collect();

        let mut deltas = Vec::new();

        for deleted_id in saved_ids.difference(&current_ids) {
            deltas.push(ContainerDelta::Deleted(*deleted_id));
        }

        for container in &self.current {
            if !saved_ids.contains(&container.block_id) {
                deltas.push(ContainerDelta::Created(container.block_id));
                continue;
            }
            let saved_container = self
                .saved
                .iter()
                .find(|c| c.block_id == container.block_id)
                .expect("id present in saved_ids");

            if Rc::ptr_eq(saved_container, container) {
                continue;
            }
            if saved_container.as_ref() == container.as_ref() {
                continue;
            }
            deltas.push(ContainerDelta::Updated(container.block_id));
        }

        deltas
    }

    /// Applies every pending change in one transaction via
    /// [`BlockRepository::apply_batch`]. On success the session becomes
    /// clean; on failure `current` is left untouched so the caller can
    /// retry or discard.
    pub async fn save(&mut self, repo: &dyn BlockRepository, section_id: Uuid) -> Result<()> {
        let deltas = self.diff();
        if deltas.is_empty() {
            return Ok(());
        }

        let mut creates = Vec::new();
        let mut updates = Vec::new();
        let mut deletes = Vec::new();

        for delta in &deltas {
            match delta {
                ContainerDelta::Created(id) => {
                    let container = self
                        .current
                        .iter()
                        .find(|c| c.block_id == *id)
                        .expect("created id present in current");
                    creates.push(container_to_block(container, section_id));
                }
                ContainerDelta::Updated(id) => {
                    let container = self
                        .current
                        .iter()
                        .find(|c| c.block_id == *id)
                        .expect("updated id present in current");
                    updates.push(container_to_block(container, section_id));
                }
                ContainerDelta::Deleted(id) => deletes.push(*id),
            }
        }

        repo.apply_batch(&creates, &updates, &deletes).await?;

        self.saved = self.current.clone();
        Ok(())
    }
}

fn container_to_block(container: &Container, section_id: Uuid) -> Block {
    let now = Utc::now();
    Block {
        id: container.block_id,
        section_id,
        kind: container.kind,
        heading_level: heading_level(container),
        language: container.language.clone(),
        order_index: container.order_index,
        source_text: serialize_nodes(&container.nodes),
        created_at: now,
        updated_at: now,
    }
}

fn heading_level(container: &Container) -> Option<i16> {
    container.nodes.iter().find_map(|node| match node {
        crate::model::ContentNode::Heading(level, _) => Some(*level as i16),
        _ => None,
    })
}
