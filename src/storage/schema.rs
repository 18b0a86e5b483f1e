//! PostgreSQL schema for normalized race data
//!
//! Tables:
//! - venues: Racecourses, unique by name
//! - horses: Horses, unique by name, enriched over time
//! - persons: Riders and trainers, unique by (name, role)
//! - races: One row per race, unique by (name, race_date)
//! - runners: One row per horse per race, unique by (race_id, number)

use anyhow::Result;
use sqlx::PgPool;

/// Full schema, idempotent. Also printable via the `schema` CLI mode so a
/// fresh database can be prepared with psql alone.
pub const SETUP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS venues (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    city TEXT
);

CREATE TABLE IF NOT EXISTS horses (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    sex TEXT,
    breed TEXT,
    sire TEXT,
    dam TEXT
);

CREATE TABLE IF NOT EXISTS persons (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    UNIQUE (name, role)
);

CREATE TABLE IF NOT EXISTS races (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    race_date TIMESTAMP NOT NULL,
    venue TEXT,
    discipline TEXT,
    distance INTEGER,
    purse BIGINT,
    track_condition TEXT,
    weather TEXT,
    starter_count INTEGER,
    UNIQUE (name, race_date)
);

CREATE TABLE IF NOT EXISTS runners (
    id BIGSERIAL PRIMARY KEY,
    race_id BIGINT NOT NULL REFERENCES races(id),
    horse_id BIGINT NOT NULL REFERENCES horses(id),
    rider_id BIGINT REFERENCES persons(id),
    trainer_id BIGINT REFERENCES persons(id),
    number INTEGER NOT NULL,
    age INTEGER,
    weight DOUBLE PRECISION,
    handicap INTEGER,
    form TEXT,
    morning_odds DOUBLE PRECISION,
    current_odds DOUBLE PRECISION,
    is_favorite BOOLEAN NOT NULL DEFAULT FALSE,
    finish_place INTEGER,
    finish_time TEXT,
    earnings DOUBLE PRECISION,
    UNIQUE (race_id, number)
);

CREATE INDEX IF NOT EXISTS idx_races_date ON races(race_date);
CREATE INDEX IF NOT EXISTS idx_runners_race ON runners(race_id);
CREATE INDEX IF NOT EXISTS idx_runners_horse ON runners(horse_id);
"#;

/// Create all tables in the database
pub async fn create_tables(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SETUP_SQL).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_sql_covers_all_tables() {
        for table in ["venues", "horses", "persons", "races", "runners"] {
            assert!(
                SETUP_SQL.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
        // Idempotence relies on IF NOT EXISTS throughout
        assert!(!SETUP_SQL.contains("DROP"));
    }
}
