pub const SCHEMA: &str = r#"
-- Registered remote sites. Soft-deleted on unregister.
CREATE TABLE IF NOT EXISTS sites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    contact_name TEXT,
    contact_email TEXT,
    language TEXT,
    country TEXT,
    privacy TEXT NOT NULL DEFAULT 'public',      -- public | private | hidden
    max_publications_per_day INTEGER,            -- NULL = hub default
    deleted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Published course directory entries
CREATE TABLE IF NOT EXISTS courses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
    site_course_id INTEGER NOT NULL,             -- course id on the publishing site
    shortname TEXT NOT NULL UNIQUE,
    fullname TEXT NOT NULL,
    description TEXT,
    language TEXT,
    license TEXT,
    publisher_name TEXT,
    creator_name TEXT,
    enrollable INTEGER NOT NULL DEFAULT 0,
    downloadable INTEGER NOT NULL DEFAULT 1,
    hidden INTEGER NOT NULL DEFAULT 0,           -- excluded from search unless admin
    screenshot_count INTEGER NOT NULL DEFAULT 0,

    -- Opaque handle into the backup file store
    backup_path TEXT,

    -- Locally materialized demo instance, if any
    demo_course_id INTEGER,
    demo_course_url TEXT,

    published_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(site_id, site_course_id)
);

-- Admissible values per tag dimension. Fixed dimensions are seeded at
-- install time; free-form options are created per submission.
CREATE TABLE IF NOT EXISTS tag_options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dimension TEXT NOT NULL,
    value TEXT NOT NULL
);

-- Join rows linking courses to tag options
CREATE TABLE IF NOT EXISTS tag_assignments (
    course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    option_id INTEGER NOT NULL REFERENCES tag_options(id) ON DELETE CASCADE,
    PRIMARY KEY (course_id, option_id)
);

-- Auth credentials; site tokens reference the registered site
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- short prefix for fast lookup
    is_admin INTEGER NOT NULL DEFAULT 0,
    site_id INTEGER REFERENCES sites(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,                   -- NULL = never
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_courses_site ON courses(site_id);
CREATE INDEX IF NOT EXISTS idx_courses_published ON courses(site_id, published_at);
CREATE INDEX IF NOT EXISTS idx_tag_options_dimension ON tag_options(dimension);
CREATE INDEX IF NOT EXISTS idx_tag_assignments_option ON tag_assignments(option_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_site ON tokens(site_id);

-- Shared free-form values are deduplicated case-insensitively; the index
-- settles concurrent inserts of the same new value.
CREATE UNIQUE INDEX IF NOT EXISTS idx_tag_options_shared_value
    ON tag_options(dimension, lower(value)) WHERE dimension = 'tags';
"#;
