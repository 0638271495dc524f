//! SQLite snapshot store for entity graphs

use super::traits::{OpenStore, StorageError, StorageResult};
use crate::graph::{parse_ntriples, Literal, Term, Triple};
use crate::session::{SessionResult, TripleSource};
use rusqlite::{params, Connection};
use std::io::BufRead;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed triple snapshot
///
/// Uses a single table of triples keyed by all of their components, so
/// repeated imports are idempotent. Thread-safe via an internal mutex on the
/// connection.
pub struct SqliteSource {
    conn: Mutex<Connection>,
}

impl SqliteSource {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Absent datatype/language are stored as '' so the key stays unique
            CREATE TABLE IF NOT EXISTS triples (
                subject TEXT NOT NULL,
                predicate TEXT NOT NULL,
                object_kind TEXT NOT NULL,
                object_value TEXT NOT NULL,
                datatype TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (subject, predicate, object_kind, object_value, datatype, language)
            );

            CREATE INDEX IF NOT EXISTS idx_triples_predicate
                ON triples(predicate);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::CorruptRow("connection mutex poisoned".into()))
    }

    fn encode(term: &Term) -> (&'static str, &str, &str, &str) {
        match term {
            Term::Resource { uri } => ("resource", uri.as_str(), "", ""),
            Term::Blank { id } => ("blank", id.as_str(), "", ""),
            Term::Literal(lit) => (
                "literal",
                lit.value.as_str(),
                lit.datatype.as_deref().unwrap_or(""),
                lit.language.as_deref().unwrap_or(""),
            ),
        }
    }

    fn decode(kind: &str, value: String, datatype: String, language: String) -> StorageResult<Term> {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        match kind {
            "resource" => Ok(Term::Resource { uri: value }),
            "blank" => Ok(Term::Blank { id: value }),
            "literal" => Ok(Term::Literal(Literal {
                value,
                datatype: non_empty(datatype),
                language: non_empty(language),
            })),
            other => Err(StorageError::CorruptRow(format!("unknown object kind '{}'", other))),
        }
    }

    /// Insert triples, ignoring ones already stored. Returns how many were new.
    pub fn insert_triples(&self, triples: &[Triple]) -> StorageResult<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO triples
                    (subject, predicate, object_kind, object_value, datatype, language)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for triple in triples {
                let (kind, value, datatype, language) = Self::encode(&triple.object);
                inserted += stmt.execute(params![
                    triple.subject,
                    triple.predicate,
                    kind,
                    value,
                    datatype,
                    language
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Parse an N-Triples document and store its triples
    pub fn import_ntriples<R: BufRead>(&self, reader: R) -> StorageResult<usize> {
        let triples = parse_ntriples(reader)?;
        self.insert_triples(&triples)
    }

    pub fn triple_count(&self) -> StorageResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM triples", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All triples with the given subject, in insertion order
    pub fn triples_about(&self, subject: &str) -> StorageResult<Vec<Triple>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT predicate, object_kind, object_value, datatype, language
             FROM triples WHERE subject = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![subject], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(predicate, kind, value, datatype, language)| {
                let object = Self::decode(&kind, value, datatype, language)?;
                Ok(Triple::new(subject, predicate, object))
            })
            .collect()
    }
}

impl OpenStore for SqliteSource {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TripleSource for SqliteSource {
    fn dereference(&self, uri: &str) -> SessionResult<Vec<Triple>> {
        Ok(self.triples_about(uri)?)
    }
}
