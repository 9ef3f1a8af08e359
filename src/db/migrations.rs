use rusqlite::Connection;

use crate::error::ShiftopsError;

pub fn run_migrations(conn: &Connection) -> Result<(), ShiftopsError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dealerships (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            dealership_id TEXT NOT NULL REFERENCES dealerships(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- No foreign key on dealership_id: the generation sweep reports
        -- generators whose dealership is gone.
        CREATE TABLE IF NOT EXISTS generators (
            id TEXT PRIMARY KEY,
            dealership_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            recurrence TEXT NOT NULL
                CHECK (recurrence IN ('none', 'daily', 'weekly', 'monthly')),
            appear_time TEXT NOT NULL,
            deadline_time TEXT,
            days_of_week TEXT NOT NULL DEFAULT '[]',
            days_of_month TEXT NOT NULL DEFAULT '[]',
            start_date TEXT NOT NULL,
            end_date TEXT,
            task_type TEXT NOT NULL DEFAULT 'individual'
                CHECK (task_type IN ('individual', 'group')),
            response_type TEXT NOT NULL DEFAULT 'completion'
                CHECK (response_type IN ('notification', 'completion', 'completion_with_proof')),
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('low', 'medium', 'high')),
            tags TEXT NOT NULL DEFAULT '[]',
            last_generated_at TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS generator_assignees (
            generator_id TEXT NOT NULL REFERENCES generators(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (generator_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            dealership_id TEXT NOT NULL REFERENCES dealerships(id) ON DELETE CASCADE,
            generator_id TEXT REFERENCES generators(id) ON DELETE SET NULL,
            generation_period TEXT,
            title TEXT NOT NULL,
            description TEXT,
            task_type TEXT NOT NULL DEFAULT 'individual'
                CHECK (task_type IN ('individual', 'group')),
            response_type TEXT NOT NULL DEFAULT 'completion'
                CHECK (response_type IN ('notification', 'completion', 'completion_with_proof')),
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('low', 'medium', 'high')),
            tags TEXT NOT NULL DEFAULT '[]',
            appear_at TEXT NOT NULL,
            deadline_at TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            archived_at TEXT,
            archive_reason TEXT
                CHECK (archive_reason IS NULL
                       OR archive_reason IN ('completed', 'expired', 'expired_after_shift')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (archived_at IS NULL OR is_active = 0)
        );

        CREATE TABLE IF NOT EXISTS task_assignments (
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (task_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS task_responses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            status TEXT NOT NULL
                CHECK (status IN ('pending', 'acknowledged', 'pending_review', 'completed', 'rejected')),
            comment TEXT,
            responded_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (task_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id TEXT PRIMARY KEY,
            dealership_id TEXT NOT NULL REFERENCES dealerships(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            shift_start TEXT NOT NULL,
            shift_end TEXT,
            archived_tasks_processed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dealership_id TEXT REFERENCES dealerships(id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_generator_period
            ON tasks(generator_id, generation_period);
        CREATE INDEX IF NOT EXISTS idx_tasks_dealership_active
            ON tasks(dealership_id, is_active);
        CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline_at)
            WHERE is_active = 1;
        CREATE INDEX IF NOT EXISTS idx_generators_dealership
            ON generators(dealership_id, is_active);
        CREATE INDEX IF NOT EXISTS idx_responses_task ON task_responses(task_id);
        CREATE INDEX IF NOT EXISTS idx_shifts_pending
            ON shifts(archived_tasks_processed, shift_end);
        CREATE INDEX IF NOT EXISTS idx_settings_scope ON settings(dealership_id, key);
        ",
    )?;
    Ok(())
}
