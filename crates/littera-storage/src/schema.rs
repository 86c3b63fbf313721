use littera_core::Result;

/// Monotonic identifier recorded in `schema_migrations` for the one migration
/// this crate currently ships. Bump and add a new `CREATE_TABLES`-style
/// constant (never edit this one in place) when the schema changes.
pub const MIGRATION_ID: &str = "0001_initial";

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// Full DDL for every table and index in a Work's embedded Postgres cluster.
///
/// Every statement uses `IF NOT EXISTS` so that [`run_migrations`] is
/// idempotent and safe to call against an already-initialised cluster.
pub const CREATE_TABLES: &str = "
-- -------------------------------------------------------------------------
-- works / documents / sections
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS works (
    id          UUID        NOT NULL PRIMARY KEY,
    title       TEXT        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id          UUID        NOT NULL PRIMARY KEY,
    work_id     UUID        NOT NULL REFERENCES works(id) ON DELETE CASCADE,
    title       TEXT        NOT NULL,
    language    TEXT        NOT NULL,
    order_index INTEGER     NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_work_id ON documents (work_id);

CREATE TABLE IF NOT EXISTS sections (
    id          UUID        NOT NULL PRIMARY KEY,
    document_id UUID        NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    parent_id   UUID                 REFERENCES sections(id)  ON DELETE CASCADE,
    title       TEXT,
    order_index INTEGER     NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sections_document_id ON sections (document_id);
CREATE INDEX IF NOT EXISTS idx_sections_parent_id ON sections (parent_id);

-- -------------------------------------------------------------------------
-- blocks
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS blocks (
    id              UUID        NOT NULL PRIMARY KEY,
    section_id      UUID        NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
    kind            TEXT        NOT NULL,
    heading_level   SMALLINT,
    language        TEXT        NOT NULL,
    order_index     INTEGER     NOT NULL DEFAULT 0,
    source_text     TEXT        NOT NULL DEFAULT '',
    created_at      TIMESTAMPTZ NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_blocks_section_id ON blocks (section_id);

-- -------------------------------------------------------------------------
-- entities / entity_labels / entity_work_metadata
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS entities (
    id          UUID        NOT NULL PRIMARY KEY,
    properties  JSONB       NOT NULL DEFAULT '{}',
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS entity_labels (
    entity_id   UUID    NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    language    TEXT    NOT NULL,
    text        TEXT    NOT NULL,
    aliases     JSONB   NOT NULL DEFAULT '[]',
    PRIMARY KEY (entity_id, language)
);

CREATE TABLE IF NOT EXISTS entity_work_metadata (
    entity_id   UUID  NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    work_id     UUID  NOT NULL REFERENCES works(id)    ON DELETE CASCADE,
    notes       TEXT,
    metadata    JSONB NOT NULL DEFAULT '{}',
    PRIMARY KEY (entity_id, work_id)
);

CREATE INDEX IF NOT EXISTS idx_entity_work_metadata_work_id
    ON entity_work_metadata (work_id);

-- -------------------------------------------------------------------------
-- mentions
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS mentions (
    id                      UUID  NOT NULL PRIMARY KEY,
    block_id                UUID  NOT NULL REFERENCES blocks(id)   ON DELETE CASCADE,
    entity_id               UUID  NOT NULL REFERENCES entities(id) ON DELETE CASCADE,
    language                TEXT  NOT NULL,
    features                JSONB NOT NULL DEFAULT '{}',
    observed_surface_form   TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS uq_mentions_block_entity_language
    ON mentions (block_id, entity_id, language);
CREATE INDEX IF NOT EXISTS idx_mentions_entity_id ON mentions (entity_id);

-- -------------------------------------------------------------------------
-- block_alignments
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS block_alignments (
    id              UUID    NOT NULL PRIMARY KEY,
    block_a         UUID    NOT NULL REFERENCES blocks(id) ON DELETE CASCADE,
    block_b         UUID    NOT NULL REFERENCES blocks(id) ON DELETE CASCADE,
    alignment_type  TEXT    NOT NULL,
    confidence      DOUBLE PRECISION NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_block_alignments_block_a ON block_alignments (block_a);
CREATE INDEX IF NOT EXISTS idx_block_alignments_block_b ON block_alignments (block_b);

-- -------------------------------------------------------------------------
-- reviews
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS reviews (
    id          UUID        NOT NULL PRIMARY KEY,
    work_id     UUID        NOT NULL REFERENCES works(id) ON DELETE CASCADE,
    scope       TEXT        NOT NULL,
    scope_id    UUID        NOT NULL,
    issue_type  TEXT        NOT NULL,
    severity    TEXT        NOT NULL,
    message     TEXT        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_work_id ON reviews (work_id);
CREATE INDEX IF NOT EXISTS idx_reviews_scope_id ON reviews (scope_id);

-- -------------------------------------------------------------------------
-- schema_migrations
-- -------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS schema_migrations (
    id          TEXT        NOT NULL PRIMARY KEY,
    applied_at  TIMESTAMPTZ NOT NULL
);
";

// ---------------------------------------------------------------------------
// Migration runner
// ---------------------------------------------------------------------------

/// Apply every table/index in [`CREATE_TABLES`] and record the migration as
/// applied. Safe to call repeatedly: the DDL is idempotent and the
/// `schema_migrations` marker row is only inserted if absent.
pub async fn run_migrations(client: &deadpool_postgres::Client) -> Result<()> {
    client.batch_execute(CREATE_TABLES).await?;

    let applied: bool = client
        .query_opt(
            "SELECT 1 FROM schema_migrations WHERE id = $1",
            &[&MIGRATION_ID],
        )
        .await?
        .is_some();

    if !applied {
        client
            .execute(
                "INSERT INTO schema_migrations (id, applied_at) VALUES ($1, now())",
                &[&MIGRATION_ID],
            )
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_tables_mentions_every_expected_table() {
        let expected = [
            "works",
            "documents",
            "sections",
            "blocks",
            "entities",
            "entity_labels",
            "entity_work_metadata",
            "mentions",
            "block_alignments",
            "reviews",
            "schema_migrations",
        ];
        for table in expected {
            assert!(
                CREATE_TABLES.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn ddl_statements_are_idempotent_by_construction() {
        // Every CREATE TABLE/INDEX must carry IF NOT EXISTS.
        for line in CREATE_TABLES.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("CREATE TABLE") {
                assert!(trimmed.contains("IF NOT EXISTS"), "non-idempotent: {line}");
            }
            if trimmed.starts_with("CREATE INDEX") || trimmed.starts_with("CREATE UNIQUE INDEX") {
                assert!(trimmed.contains("IF NOT EXISTS"), "non-idempotent: {line}");
            }
        }
    }
}
