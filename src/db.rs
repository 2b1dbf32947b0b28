use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, TransactionBehavior};

/// One row of the `recipe` table, decoded by column name. Columns the
/// cleanup never touches (season, course, url, page) are left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub recipe_id: i64,
    pub book_id: Option<i64>,
    pub recipe_name: String,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing recipes database read-write. The table is expected
    /// to already exist; a missing file is an error, not a fresh database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Fetch every recipe row. `book` is the schema's column name for what
    /// the rest of the code calls `book_id`.
    pub fn recipes(&self) -> Result<Vec<RecipeRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT recipe_id, book, recipe_name FROM recipe")
            .context("recipe table has an unexpected shape")?;
        let rows = stmt.query_map([], |row| {
            Ok(RecipeRecord {
                recipe_id: row.get("recipe_id")?,
                book_id: row.get("book")?,
                recipe_name: row.get("recipe_name")?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Apply all staged renames in one transaction with a single commit.
    /// A failure part-way drops the transaction and rolls everything back.
    pub fn apply_renames(&mut self, renames: &[(i64, String)]) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt =
                tx.prepare("UPDATE recipe SET recipe_name = ?1 WHERE recipe_id = ?2")?;
            for (recipe_id, name) in renames {
                stmt.execute(params![name, recipe_id])
                    .with_context(|| format!("failed to rename recipe {}", recipe_id))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
