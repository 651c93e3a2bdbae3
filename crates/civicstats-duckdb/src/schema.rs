/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` is passed at runtime from `Config.duckdb_memory_limit`
/// (env `CIVICSTATS_DUCKDB_MEMORY`, default `"1GB"`). Always set an explicit
/// limit: the DuckDB default (80% of system RAM) is not acceptable for a
/// server process.
///
/// Timestamps are stored as naive UTC `TIMESTAMP` values.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- SETTINGS (platform configuration)
-- ===========================================
-- Keys stored in this table:
--   'timezone'             – IANA timezone the platform reports in
--   'platform_created_at'  – RFC 3339 instant the platform went live
--   'version'              – Database schema version
CREATE TABLE IF NOT EXISTS settings (
    key             VARCHAR PRIMARY KEY,
    value           VARCHAR NOT NULL
);

-- ===========================================
-- CATALOGS
-- ===========================================
CREATE TABLE IF NOT EXISTS projects (
    id                    VARCHAR PRIMARY KEY,
    title                 VARCHAR NOT NULL DEFAULT '',
    participation_method  VARCHAR NOT NULL DEFAULT 'ideation'  -- 'ideation' | 'native_survey' | ...
);

CREATE TABLE IF NOT EXISTS idea_statuses (
    id              VARCHAR PRIMARY KEY,
    code            VARCHAR NOT NULL,                  -- 'proposed' | 'accepted' | ...
    title           VARCHAR NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS topics (
    id              VARCHAR PRIMARY KEY,
    title           VARCHAR NOT NULL DEFAULT ''
);

-- ===========================================
-- IDEAS
-- ===========================================
CREATE TABLE IF NOT EXISTS ideas (
    id              VARCHAR PRIMARY KEY,
    project_id      VARCHAR NOT NULL,
    author_id       VARCHAR,                           -- NULL for anonymous ideas
    status_id       VARCHAR NOT NULL,
    published_at    TIMESTAMP                          -- NULL while still a draft
);
CREATE INDEX IF NOT EXISTS idx_ideas_published
    ON ideas(published_at);
CREATE INDEX IF NOT EXISTS idx_ideas_project_published
    ON ideas(project_id, published_at);

CREATE TABLE IF NOT EXISTS ideas_topics (
    idea_id         VARCHAR NOT NULL,
    topic_id        VARCHAR NOT NULL,
    ordering        INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (idea_id, topic_id)
);
CREATE INDEX IF NOT EXISTS idx_ideas_topics_topic
    ON ideas_topics(topic_id);

CREATE TABLE IF NOT EXISTS official_feedbacks (
    id              VARCHAR PRIMARY KEY,
    idea_id         VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_official_feedbacks_idea
    ON official_feedbacks(idea_id);

-- ===========================================
-- GROUP MEMBERSHIPS
-- ===========================================
CREATE TABLE IF NOT EXISTS memberships (
    group_id        VARCHAR NOT NULL,
    user_id         VARCHAR NOT NULL,
    PRIMARY KEY (group_id, user_id)
);
"#
    )
}
