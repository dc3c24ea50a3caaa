//! `propeval-store` — SQLite-backed classification store.
//!
//! One row per (pair, property), enforced by the primary key. The automatic
//! path uses `INSERT OR IGNORE`, so concurrent writers cannot produce a
//! second row or replace an existing one.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use propeval_engine::model::{ClassificationRecord, Label, PairKey, Source, Stored};
use propeval_engine::store::ClassificationStore;
use propeval_engine::EvalError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS classifications (
    ground_truth TEXT NOT NULL,
    predicted TEXT NOT NULL,
    property TEXT NOT NULL,
    label TEXT NOT NULL,         -- TP, FP, TN, FN
    source TEXT NOT NULL,        -- automatic, override
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (ground_truth, predicted, property)
);
"#;

pub struct SqliteStore {
    conn: Connection,
}

fn store_err(e: rusqlite::Error) -> EvalError {
    EvalError::Store(e.to_string())
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, EvalError> {
        let conn = Connection::open(path).map_err(store_err)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, EvalError> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, EvalError> {
        conn.execute_batch(SCHEMA).map_err(store_err)?;
        Ok(Self { conn })
    }

    fn read_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<(String, String)> {
        Ok((row.get(offset)?, row.get(offset + 1)?))
    }

    fn decode(label: &str, source: &str) -> Result<Stored, EvalError> {
        Ok(Stored { label: label.parse::<Label>()?, source: source.parse::<Source>()? })
    }
}

impl ClassificationStore for SqliteStore {
    fn get(&self, pair: &PairKey, property: &str) -> Result<Option<Stored>, EvalError> {
        let row = self
            .conn
            .query_row(
                "SELECT label, source FROM classifications
                 WHERE ground_truth = ?1 AND predicted = ?2 AND property = ?3",
                params![pair.ground_truth, pair.predicted, property],
                |row| Self::read_row(row, 0),
            )
            .optional()
            .map_err(store_err)?;

        match row {
            Some((label, source)) => Ok(Some(Self::decode(&label, &source)?)),
            None => Ok(None),
        }
    }

    fn insert_if_absent(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<bool, EvalError> {
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO classifications (ground_truth, predicted, property, label, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    pair.ground_truth,
                    pair.predicted,
                    property,
                    label.code(),
                    Source::Automatic.as_str()
                ],
            )
            .map_err(store_err)?;
        Ok(changed == 1)
    }

    fn upsert(
        &mut self,
        pair: &PairKey,
        property: &str,
        label: Label,
    ) -> Result<Option<Stored>, EvalError> {
        let tx = self.conn.transaction().map_err(store_err)?;

        let previous = tx
            .query_row(
                "SELECT label, source FROM classifications
                 WHERE ground_truth = ?1 AND predicted = ?2 AND property = ?3",
                params![pair.ground_truth, pair.predicted, property],
                |row| Self::read_row(row, 0),
            )
            .optional()
            .map_err(store_err)?;

        tx.execute(
            "INSERT INTO classifications (ground_truth, predicted, property, label, source)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (ground_truth, predicted, property)
             DO UPDATE SET label = excluded.label,
                           source = excluded.source,
                           updated_at = CURRENT_TIMESTAMP",
            params![
                pair.ground_truth,
                pair.predicted,
                property,
                label.code(),
                Source::Override.as_str()
            ],
        )
        .map_err(store_err)?;
        tx.commit().map_err(store_err)?;

        match previous {
            Some((label, source)) => Ok(Some(Self::decode(&label, &source)?)),
            None => Ok(None),
        }
    }

    fn remove_pair(&mut self, pair: &PairKey) -> Result<usize, EvalError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM classifications WHERE ground_truth = ?1 AND predicted = ?2",
                params![pair.ground_truth, pair.predicted],
            )
            .map_err(store_err)?;
        log::debug!("{pair}: removed {removed} classification(s)");
        Ok(removed)
    }

    fn records(&self) -> Result<Vec<ClassificationRecord>, EvalError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT ground_truth, predicted, property, label, source FROM classifications
                 ORDER BY ground_truth, predicted, property",
            )
            .map_err(store_err)?;

        let rows = stmt
            .query_map([], |row| {
                let pair = Self::read_row(row, 0)?;
                let property: String = row.get(2)?;
                let stored = Self::read_row(row, 3)?;
                Ok((pair, property, stored))
            })
            .map_err(store_err)?;

        let mut out = Vec::new();
        for row in rows {
            let ((ground_truth, predicted), property, (label, source)) = row.map_err(store_err)?;
            let stored = Self::decode(&label, &source)?;
            out.push(ClassificationRecord {
                pair: PairKey { ground_truth, predicted },
                property,
                label: stored.label,
                source: stored.source,
            });
        }
        Ok(out)
    }

    fn records_for(&self, pair: &PairKey) -> Result<Vec<ClassificationRecord>, EvalError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT property, label, source FROM classifications
                 WHERE ground_truth = ?1 AND predicted = ?2
                 ORDER BY property",
            )
            .map_err(store_err)?;

        let rows = stmt
            .query_map(params![pair.ground_truth, pair.predicted], |row| {
                let property: String = row.get(0)?;
                let stored = Self::read_row(row, 1)?;
                Ok((property, stored))
            })
            .map_err(store_err)?;

        let mut out = Vec::new();
        for row in rows {
            let (property, (label, source)) = row.map_err(store_err)?;
            let stored = Self::decode(&label, &source)?;
            out.push(ClassificationRecord {
                pair: pair.clone(),
                property,
                label: stored.label,
                source: stored.source,
            });
        }
        Ok(out)
    }
}
