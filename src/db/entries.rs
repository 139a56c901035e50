use rusqlite::{params, Row};

use crate::models::{Entry, EntryFields};

use super::connection::SqliteEntryStore;
use super::error::{Error, Operation, Result};
use super::EntryStore;

const SELECT_ENTRIES: &str = "SELECT id, name, address, phone, email,
        emergency_contact_1, emergency_contact_2, date_of_birth,
        id_type, id_number, id_expiry, result
     FROM entries
     ORDER BY id";

/// Hydrate an [`Entry`] from a row produced by [`SELECT_ENTRIES`].
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        fields: EntryFields {
            name: row.get(1)?,
            address: row.get(2)?,
            phone: row.get(3)?,
            email: row.get(4)?,
            emergency_contact_1: row.get(5)?,
            emergency_contact_2: row.get(6)?,
            date_of_birth: row.get(7)?,
            id_type: row.get(8)?,
            id_number: row.get(9)?,
            id_expiry: row.get(10)?,
            result: row.get(11)?,
        },
    })
}

impl EntryStore for SqliteEntryStore {
    type Error = Error;

    async fn add(&self, fields: EntryFields) -> Result<Entry> {
        let row = fields.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO entries (
                        name, address, phone, email,
                        emergency_contact_1, emergency_contact_2, date_of_birth,
                        id_type, id_number, id_expiry, result
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        row.name,
                        row.address,
                        row.phone,
                        row.email,
                        row.emergency_contact_1,
                        row.emergency_contact_2,
                        row.date_of_birth,
                        row.id_type,
                        row.id_number,
                        row.id_expiry,
                        row.result,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::operation(Operation::Add))?;

        Ok(Entry { id, fields })
    }

    async fn get_all(&self) -> Result<Vec<Entry>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(SELECT_ENTRIES)?;
                let entries = stmt
                    .query_map([], entry_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(entries)
            })
            .await
            .map_err(Error::operation(Operation::GetAll))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(Error::operation(Operation::Delete))
    }

    async fn clear(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM entries", [])?;
                Ok(())
            })
            .await
            .map_err(Error::operation(Operation::Clear))
    }
}
