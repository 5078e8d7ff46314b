use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create storages table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS storages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL,
            address TEXT NOT NULL,
            temperature REAL NOT NULL,
            contact TEXT,
            description TEXT,
            directions TEXT,
            photo TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create boxes table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS boxes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            number TEXT NOT NULL UNIQUE,
            storage_id INTEGER NOT NULL,
            level INTEGER NOT NULL,
            height REAL NOT NULL,
            width REAL NOT NULL,
            length REAL NOT NULL,
            area REAL NOT NULL DEFAULT 0,
            monthly_price REAL NOT NULL DEFAULT 0,
            is_occupied INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (storage_id) REFERENCES storages(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_boxes_storage_id ON boxes(storage_id);
        CREATE INDEX IF NOT EXISTS idx_boxes_is_occupied ON boxes(is_occupied);
        "#
        .to_owned(),
    ))
    .await?;

    // Create users table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create rents table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS rents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            email TEXT NOT NULL,
            box_id INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'created',
            pickup_address TEXT,
            total_price REAL NOT NULL DEFAULT 0,
            is_delivery_needed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL,
            FOREIGN KEY (box_id) REFERENCES boxes(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_rents_user_id ON rents(user_id);
        CREATE INDEX IF NOT EXISTS idx_rents_box_id ON rents(box_id);
        CREATE INDEX IF NOT EXISTS idx_rents_status ON rents(status);
        CREATE INDEX IF NOT EXISTS idx_rents_email ON rents(email);
        "#
        .to_owned(),
    ))
    .await?;

    // Migration: task bookkeeping columns added after the initial schema.
    // SQLite doesn't support IF NOT EXISTS in ALTER TABLE, so we ignore errors
    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE rents ADD COLUMN task_ids TEXT NOT NULL DEFAULT '[]'".to_owned(),
        ))
        .await;

    let _ = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "ALTER TABLE rents ADD COLUMN is_partial_pickup_allowed INTEGER NOT NULL DEFAULT 0"
                .to_owned(),
        ))
        .await;

    // Create scheduled_jobs table (the delayed-job queue)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_jobs (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            payload TEXT NOT NULL,
            run_at TEXT NOT NULL,
            is_revoked INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_scheduled_jobs_due ON scheduled_jobs(is_revoked, run_at);
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}
