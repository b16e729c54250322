//! SQLite-backed named stores.
//!
//! Each store is a row in `cache_stores`; its entries live in `cache_entries`
//! and are removed by cascade when the store row is deleted.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

use super::connection::CacheDb;
use super::hash::request_key;
use super::storage::CacheStorage;
use crate::Error;
use crate::http::{CapturedResponse, Request};

/// An entry flattened into owned column values, ready to move onto the
/// database thread.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    response_url: String,
    status_code: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &CapturedResponse) -> Result<Self, Error> {
        Ok(Self {
            key_hash: request_key(request),
            method: request.method().to_string(),
            url: request.url().to_string(),
            response_url: response.url.clone(),
            status_code: response.status,
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.to_vec(),
        })
    }
}

fn ensure_store(conn: &rusqlite::Connection, name: &str, now: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_stores (name, created_at) VALUES (?1, ?2)
         ON CONFLICT(name) DO NOTHING",
        params![name, now],
    )?;
    Ok(())
}

fn upsert_entry(conn: &rusqlite::Connection, name: &str, row: &EntryRow, now: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_entries (
            store_name, key_hash, method, url, response_url,
            status_code, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(store_name, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            response_url = excluded.response_url,
            status_code = excluded.status_code,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            name,
            &row.key_hash,
            &row.method,
            &row.url,
            &row.response_url,
            row.status_code,
            &row.headers_json,
            &row.body,
            now,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_store(conn, &name, &now) })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn lookup(&self, name: &str, request: &Request) -> Result<Option<CapturedResponse>, Error> {
        let name = name.to_string();
        let key_hash = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<CapturedResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT response_url, status_code, headers_json, body
                         FROM cache_entries WHERE store_name = ?1 AND key_hash = ?2",
                        params![name, key_hash],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, u16>(1)?,
                                row.get::<_, String>(2)?,
                                row.get::<_, Vec<u8>>(3)?,
                            ))
                        },
                    )
                    .optional()?;

                let Some((url, status, headers_json, body)) = row else {
                    return Ok(None);
                };

                Ok(Some(CapturedResponse {
                    url,
                    status,
                    headers: serde_json::from_str(&headers_json)?,
                    body: Bytes::from(body),
                }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, name: &str, request: &Request, response: &CapturedResponse) -> Result<(), Error> {
        let name = name.to_string();
        let row = EntryRow::new(request, response)?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &name, &now)?;
                upsert_entry(&tx, &name, &row, &now)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, name: &str, entries: &[(Request, CapturedResponse)]) -> Result<(), Error> {
        let name = name.to_string();
        let rows = entries
            .iter()
            .map(|(request, response)| EntryRow::new(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &name, &now)?;
                for row in &rows {
                    upsert_entry(&tx, &name, row, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn urls(&self, name: &str) -> Result<Vec<String>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store_name = ?1 ORDER BY rowid")?;
                let urls = stmt
                    .query_map(params![name], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
