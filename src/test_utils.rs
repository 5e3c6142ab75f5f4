pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    fn hash_password(password: &str) -> Result<String, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into()))
    }

    /// Insert a parent account with a hashed password
    pub async fn insert_test_parent(
        pool: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, user_type, full_name) \
             VALUES (?, ?, 'parent', ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(format!("Parent {}", username))
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a student account with a hashed password, optionally owned by
    /// a parent
    pub async fn insert_test_student(
        pool: &SqlitePool,
        username: &str,
        password: &str,
        parent_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, user_type, full_name, grade_level, parent_id) \
             VALUES (?, ?, 'student', ?, '6th', ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(format!("Student {}", username))
        .bind(parent_id)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Bind a device to a student directly
    pub async fn bind_test_device(
        pool: &SqlitePool,
        student_id: i64,
        device_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO device_sessions (student_id, device_id) VALUES (?, ?)")
            .bind(student_id)
            .bind(device_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Insert a question bank row for testing
    pub async fn insert_test_question(
        pool: &SqlitePool,
        grade_level: &str,
        subject: &str,
        question_text: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO questions (grade_level, subject, question_text, options, correct_answer) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(grade_level)
        .bind(subject)
        .bind(question_text)
        .bind(r#"["a","b","c"]"#)
        .bind("a")
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
