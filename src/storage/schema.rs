//! Application schema.
//!
//! Primary keys are text (UUIDs, plus numeric strings in older data) and
//! timestamps are ISO-8601 text. Deliverables restrict deletion of their
//! event; briefings, timeline items and team assignments are owned by the
//! event and cascade. Comments are polymorphic and carry no foreign key.

use super::migrations::Migration;

/// Tables created by the schema, in creation order.
pub const TABLES: &[&str] = &[
    "users",
    "clients",
    "team_members",
    "events",
    "event_team_members",
    "briefings",
    "timeline_items",
    "deliverables",
    "comments",
    "notifications",
    "files",
    "video_edits",
    "video_comments",
    "editor_deliveries",
];

/// Schema migrations for the application database.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                email TEXT,
                access_level TEXT NOT NULL DEFAULT 'viewer',
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                company TEXT NOT NULL,
                contact_name TEXT,
                email TEXT,
                phone TEXT,
                username TEXT UNIQUE,
                password_hash TEXT,
                access_level TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS team_members (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT '',
                department TEXT,
                email TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                location TEXT,
                client_id TEXT REFERENCES clients(id),
                status TEXT NOT NULL DEFAULT 'planning',
                tags TEXT NOT NULL DEFAULT '',
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS event_team_members (
                event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                member_id TEXT NOT NULL REFERENCES team_members(id) ON DELETE CASCADE,
                role TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (event_id, member_id)
            );

            CREATE TABLE IF NOT EXISTS briefings (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                project_name TEXT NOT NULL,
                delivery_date TEXT,
                content TEXT NOT NULL DEFAULT '',
                team_lead TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timeline_items (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                responsible_id TEXT REFERENCES team_members(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'scheduled',
                priority TEXT NOT NULL DEFAULT 'medium',
                color TEXT,
                dependencies TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS deliverables (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL REFERENCES events(id),
                client_id TEXT REFERENCES clients(id),
                title TEXT NOT NULL,
                deadline TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                item_id TEXT NOT NULL,
                item_type TEXT NOT NULL,
                author TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                message TEXT NOT NULL,
                severity TEXT NOT NULL DEFAULT 'info',
                read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                expires_at TEXT
            );

            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                item_id TEXT,
                item_type TEXT,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                mime_type TEXT,
                size INTEGER,
                uploaded_by TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS video_edits (
                id TEXT PRIMARY KEY,
                event_id TEXT REFERENCES events(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                editor_id TEXT REFERENCES team_members(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                video_path TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS video_comments (
                id TEXT PRIMARY KEY,
                video_id TEXT NOT NULL REFERENCES video_edits(id) ON DELETE CASCADE,
                position_seconds REAL NOT NULL DEFAULT 0,
                author TEXT NOT NULL,
                text TEXT NOT NULL,
                resolved INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS editor_deliveries (
                id TEXT PRIMARY KEY,
                video_id TEXT NOT NULL REFERENCES video_edits(id) ON DELETE CASCADE,
                version INTEGER NOT NULL DEFAULT 1,
                delivered_at TEXT NOT NULL,
                notes TEXT
            );
        ",
    },
    Migration {
        version: 2,
        description: "Lookup indexes",
        sql: r"
            CREATE INDEX IF NOT EXISTS idx_events_client ON events(client_id);
            CREATE INDEX IF NOT EXISTS idx_events_status ON events(status);
            CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
            CREATE INDEX IF NOT EXISTS idx_briefings_event ON briefings(event_id);
            CREATE INDEX IF NOT EXISTS idx_timeline_event ON timeline_items(event_id, start_time);
            CREATE INDEX IF NOT EXISTS idx_deliverables_event ON deliverables(event_id);
            CREATE INDEX IF NOT EXISTS idx_deliverables_deadline ON deliverables(deadline);
            CREATE INDEX IF NOT EXISTS idx_comments_item ON comments(item_type, item_id);
        ",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::{MigrationRunner, max_version};
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_all_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        let applied = MigrationRunner::new(&mut conn).run(MIGRATIONS).unwrap();
        assert_eq!(applied, MIGRATIONS.len());

        for table in TABLES {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "missing table {table}");
        }
    }

    #[test]
    fn test_versions_are_sequential() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i32::try_from(i + 1).unwrap());
        }
        assert_eq!(max_version(MIGRATIONS), 2);
    }
}
