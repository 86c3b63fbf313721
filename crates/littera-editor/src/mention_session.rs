//! Mention discovery: the "type `@` and pick an Entity" experience.

use std::cell::OnceCell;

use littera_core::Result;
use littera_data::EntityLabelRepository;
use uuid::Uuid;

/// One candidate Entity offered while typing a mention trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidate {
    pub entity_id: Uuid,
    pub label_text: String,
}

/// Tracks one in-progress "@" mention trigger. Candidates are fetched once
/// (on first access) and then filtered locally on every keystroke, so typing
/// doesn't round-trip to the repository per character.
pub struct MentionSession {
    pub trigger_pos: usize,
    pub query: String,
    language: String,
    candidates: OnceCell<Vec<EntityCandidate>>,
}

impl MentionSession {
    pub fn new(trigger_pos: usize, language: impl Into<String>) -> Self {
        Self {
            trigger_pos,
            query: String::new(),
            language: language.into(),
            candidates: OnceCell::new(),
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Returns every candidate matching the current query as a case-insensitive
    /// substring of the label text, fetching the full candidate set from the
    /// repository the first time this session is asked.
    pub async fn candidates(&self, repo: &dyn EntityLabelRepository) -> Result<Vec<EntityCandidate>> {
        if self.candidates.get().is_none() {
            let labels = repo.search(&self.language).await?;
            let all = labels
                .into_iter()
                .map(|l| EntityCandidate {
                    entity_id: l.entity_id,
                    label_text: l.text,
                })
                .collect();
            // `OnceCell::set` can only fail if already set, which can't
            // happen here since we just checked `get().is_none()` under
            // exclusive `&self` access from an async context with no
            // intervening await before this point.
            let _ = self.candidates.set(all);
        }

        let query_lower = self.query.to_lowercase();
        Ok(self
            .candidates
            .get()
            .expect("candidates populated above")
            .iter()
            .filter(|c| c.label_text.to_lowercase().contains(&query_lower))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use littera_core::EntityLabel;
    use littera_data::InMemoryEntityLabelRepository;

    async fn seeded_repo() -> InMemoryEntityLabelRepository {
        let repo = InMemoryEntityLabelRepository::default();
        repo.upsert(&EntityLabel {
            entity_id: Uuid::new_v4(),
            language: "en".to_string(),
            text: "Paris".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();
        repo.upsert(&EntityLabel {
            entity_id: Uuid::new_v4(),
            language: "en".to_string(),
            text: "Parisian Cafe".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();
        repo.upsert(&EntityLabel {
            entity_id: Uuid::new_v4(),
            language: "en".to_string(),
            text: "London".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn filters_by_substring_case_insensitively() {
        let repo = seeded_repo().await;
        let mut session = MentionSession::new(0, "en");
        session.set_query("par");
        let candidates = session.candidates(&repo).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn empty_query_returns_all_candidates() {
        let repo = seeded_repo().await;
        let session = MentionSession::new(0, "en");
        let candidates = session.candidates(&repo).await.unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[tokio::test]
    async fn narrows_as_query_grows() {
        let repo = seeded_repo().await;
        let mut session = MentionSession::new(0, "en");
        session.set_query("pari");
        assert_eq!(session.candidates(&repo).await.unwrap().len(), 2);
        session.set_query("parisian");
        assert_eq!(session.candidates(&repo).await.unwrap().len(), 1);
    }
}
