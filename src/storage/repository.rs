//! PostgreSQL repository for scraped race data
//!
//! One transaction per race. Every statement is an upsert so re-scraping a
//! day is safe: a pre-race pass and a post-race pass of the same race
//! converge onto one complete runner record.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::scraper::race::RaceCard;
use crate::scraper::runners::Runner;

use super::schema::create_tables;

/// Repository over a small connection pool
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect and initialize the schema if needed
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&config.url())
            .await
            .context("Failed to connect to database")?;

        create_tables(&pool).await?;

        Ok(Self { pool })
    }

    /// Persist a race and its runners in one transaction.
    pub async fn save_race(&self, card: &RaceCard) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        upsert_venue(&mut tx, &card.venue).await?;
        let race_id = insert_race(&mut tx, card).await?;

        for runner in &card.runners {
            // Assembly already drops nameless rows; this guards direct callers
            if runner.horse_name.trim().is_empty() {
                continue;
            }

            let horse_id = upsert_horse(&mut tx, runner).await?;

            let rider_id = match runner.rider.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    Some(upsert_person(&mut tx, name, runner.rider_role.as_str()).await?)
                }
                _ => None,
            };
            let trainer_id = match runner.trainer.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    Some(upsert_person(&mut tx, name, "trainer").await?)
                }
                _ => None,
            };

            insert_runner(&mut tx, race_id, horse_id, rider_id, trainer_id, runner).await?;
        }

        tx.commit().await?;
        info!(race = %card.name, runners = card.runners.len(), "race saved");
        Ok(())
    }
}

async fn upsert_venue(conn: &mut PgConnection, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Ok(());
    }
    sqlx::query("INSERT INTO venues (name, city) VALUES ($1, $1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Insert the race if unseen, otherwise return the existing row's id.
/// Identity is (name, race_date), so the same race scraped twice maps to
/// one row.
async fn insert_race(conn: &mut PgConnection, card: &RaceCard) -> Result<i64> {
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO races
            (name, race_date, venue, discipline, distance,
             purse, track_condition, weather, starter_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (name, race_date) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(&card.name)
    .bind(card.date)
    .bind(&card.venue)
    .bind(card.discipline.as_str())
    .bind(card.distance.map(|d| d as i32))
    .bind(card.purse)
    .bind(&card.track_condition)
    .bind(&card.weather)
    .bind(card.starter_count as i32)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => {
            debug!(race = %card.name, "race already known");
            let id = sqlx::query_scalar("SELECT id FROM races WHERE name = $1 AND race_date = $2")
                .bind(&card.name)
                .bind(card.date)
                .fetch_one(&mut *conn)
                .await?;
            Ok(id)
        }
    }
}

/// Insert the horse if unseen; on conflict fill only the columns that are
/// still null, never overwrite a known value.
async fn upsert_horse(conn: &mut PgConnection, runner: &Runner) -> Result<i64> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO horses (name, sex)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE
            SET sex = COALESCE(horses.sex, EXCLUDED.sex)
        RETURNING id
        "#,
    )
    .bind(runner.horse_name.trim())
    .bind(&runner.sex)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn upsert_person(conn: &mut PgConnection, name: &str, role: &str) -> Result<i64> {
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO persons (name, role) VALUES ($1, $2)
        ON CONFLICT (name, role) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(role)
    .fetch_optional(&mut *conn)
    .await?;

    match inserted {
        Some(id) => Ok(id),
        None => {
            let id = sqlx::query_scalar("SELECT id FROM persons WHERE name = $1 AND role = $2")
                .bind(name)
                .bind(role)
                .fetch_one(&mut *conn)
                .await?;
            Ok(id)
        }
    }
}

/// Insert or update a runner by (race_id, number). Result-time fields merge
/// last-non-null-wins; entry-time fields keep their first-seen values.
async fn insert_runner(
    conn: &mut PgConnection,
    race_id: i64,
    horse_id: i64,
    rider_id: Option<i64>,
    trainer_id: Option<i64>,
    runner: &Runner,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO runners
            (race_id, horse_id, rider_id, trainer_id, number,
             age, weight, handicap, form,
             morning_odds, current_odds,
             finish_place, finish_time, earnings)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (race_id, number) DO UPDATE
            SET finish_place = COALESCE(EXCLUDED.finish_place, runners.finish_place),
                finish_time  = COALESCE(EXCLUDED.finish_time,  runners.finish_time),
                current_odds = COALESCE(EXCLUDED.current_odds, runners.current_odds),
                earnings     = COALESCE(EXCLUDED.earnings,     runners.earnings)
        "#,
    )
    .bind(race_id)
    .bind(horse_id)
    .bind(rider_id)
    .bind(trainer_id)
    .bind(runner.number as i32)
    .bind(runner.age.map(|a| a as i32))
    .bind(runner.weight)
    .bind(runner.handicap as i32)
    .bind(&runner.form)
    .bind(runner.morning_odds)
    .bind(runner.current_odds)
    .bind(runner.finish_place.map(|p| p as i32))
    .bind(&runner.finish_time)
    .bind(runner.earnings)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
