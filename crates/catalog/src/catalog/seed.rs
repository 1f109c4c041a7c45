//! Seed data ingestion.
//!
//! A seed is either a directory of CSV files (`breweries.csv`,
//! `taste_tags.csv`, `sake.csv`, `sake_taste_map.csv`, each with a header
//! row) or a JSON document with one array per table. Empty cells and empty
//! strings in optional columns load as NULL. Loading is idempotent: every row
//! is inserted with `ON CONFLICT DO NOTHING`, keyed by the natural id, so
//! re-running a seed never duplicates or overwrites rows.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

/// A complete seed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub breweries: Vec<SeedBrewery>,

    #[serde(default)]
    pub taste_tags: Vec<SeedTasteTag>,

    #[serde(default)]
    pub sake: Vec<SeedSake>,

    #[serde(default)]
    pub sake_taste_map: Vec<SeedTagLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedBrewery {
    pub id: i32,
    pub name: String,
    pub prefecture: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTasteTag {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSake {
    pub id: i32,
    pub name: String,
    pub brewery_id: i32,
    pub region: String,
    #[serde(default)]
    pub rice: Option<String>,
    #[serde(default)]
    pub seimaibuai: Option<i32>,
    #[serde(default)]
    pub nihonshudo: Option<f64>,
    #[serde(default)]
    pub acid: Option<f64>,
    #[serde(default)]
    pub alcohol: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTagLink {
    pub sake_id: i32,
    pub tag_id: i32,
}

/// Rows actually inserted per table (conflicts are skipped, not counted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub breweries: u64,
    pub taste_tags: u64,
    pub sake: u64,
    pub sake_taste_map: u64,
}

impl SeedData {
    /// Parse a seed document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid seed document")
    }

    /// Read and parse a seed file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in seed file {}", path.display()))
    }

    /// Read a seed directory holding one CSV file per table.
    pub fn from_csv_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("seed dir not found: {}", dir.display());
        }

        Ok(Self {
            breweries: read_csv(&dir.join("breweries.csv"))?,
            taste_tags: read_csv(&dir.join("taste_tags.csv"))?,
            sake: read_csv(&dir.join("sake.csv"))?,
            sake_taste_map: read_csv(&dir.join("sake_taste_map.csv"))?,
        })
    }
}

/// Deserialize every record of a headed CSV file.
fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open seed file {}", path.display()))?;
    parse_csv(reader).with_context(|| format!("in seed file {}", path.display()))
}

fn parse_csv<R, T>(mut reader: csv::Reader<R>) -> Result<Vec<T>>
where
    R: std::io::Read,
    T: DeserializeOwned,
{
    reader
        .deserialize()
        .enumerate()
        // Line 1 is the header.
        .map(|(i, record)| record.with_context(|| format!("invalid record on line {}", i + 2)))
        .collect()
}

/// Treat empty strings in optional seed columns as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Load a seed document in one transaction, parents before children.
pub async fn load_seed(pool: &PgPool, seed: &SeedData) -> Result<SeedReport> {
    let mut tx = pool
        .begin()
        .await
        .context("failed to begin seed transaction")?;

    let report = SeedReport {
        breweries: insert_breweries(&mut tx, &seed.breweries).await?,
        taste_tags: insert_taste_tags(&mut tx, &seed.taste_tags).await?,
        sake: insert_sake(&mut tx, &seed.sake).await?,
        sake_taste_map: insert_tag_links(&mut tx, &seed.sake_taste_map).await?,
    };

    tx.commit()
        .await
        .context("failed to commit seed transaction")?;

    info!(
        breweries = report.breweries,
        taste_tags = report.taste_tags,
        sake = report.sake,
        sake_taste_map = report.sake_taste_map,
        "seed loaded"
    );

    Ok(report)
}

async fn insert_breweries(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[SeedBrewery],
) -> Result<u64> {
    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO brewery (id, name, prefecture, address, url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.prefecture)
        .bind(non_empty(&row.address))
        .bind(non_empty(&row.url))
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to insert brewery {}", row.id))?;

        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn insert_taste_tags(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[SeedTasteTag],
) -> Result<u64> {
    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO taste_tag (id, label)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(&row.label)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to insert taste tag {}", row.id))?;

        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn insert_sake(tx: &mut Transaction<'_, Postgres>, rows: &[SeedSake]) -> Result<u64> {
    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO sake (
                id, name, brewery_id, region, rice, seimaibuai,
                nihonshudo, acid, alcohol, description, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7::numeric, $8::numeric, $9::numeric, $10, $11)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(row.brewery_id)
        .bind(&row.region)
        .bind(non_empty(&row.rice))
        .bind(row.seimaibuai)
        .bind(row.nihonshudo)
        .bind(row.acid)
        .bind(row.alcohol)
        .bind(non_empty(&row.description))
        .bind(non_empty(&row.image_url))
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to insert sake {}", row.id))?;

        inserted += result.rows_affected();
    }
    Ok(inserted)
}

async fn insert_tag_links(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[SeedTagLink],
) -> Result<u64> {
    let mut inserted = 0;
    for row in rows {
        let result = sqlx::query(
            r#"
            INSERT INTO sake_taste_tag_map (sake_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(row.sake_id)
        .bind(row.tag_id)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to link sake {} to tag {}", row.sake_id, row.tag_id))?;

        inserted += result.rows_affected();
    }
    Ok(inserted)
}
