//! Favorites CRUD operations.
//!
//! A favorite pins one artifact for one user. The pair `(user_id,
//! artifact_id)` is unique; adding it twice is reported, not duplicated.
//! Only the owning user may edit or remove a favorite.

use super::connection::CacheDb;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

const MAX_NAME_LEN: usize = 255;
const MAX_IMAGE_URL_LEN: usize = 2048;
const MAX_NOTES_LEN: usize = 1000;

/// A stored favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: String,
    pub artifact_id: String,
    pub item_name: String,
    pub source: String,
    pub image_url: Option<String>,
    pub culture: Option<String>,
    pub object_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for [`CacheDb::add_favorite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFavorite {
    pub user_id: String,
    pub artifact_id: String,
    pub item_name: String,
    pub source: String,
    pub image_url: Option<String>,
    pub culture: Option<String>,
    pub object_date: Option<String>,
}

/// Result of adding a favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "favorite", rename_all = "snake_case")]
pub enum FavoriteOutcome {
    Added(Favorite),
    AlreadyExists(Favorite),
}

impl NewFavorite {
    fn validate(&self) -> Result<(), Error> {
        if self.user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user_id cannot be empty".into()));
        }
        if self.artifact_id.trim().is_empty() {
            return Err(Error::InvalidInput("artifact_id cannot be empty".into()));
        }
        if self.item_name.trim().is_empty() {
            return Err(Error::InvalidInput("item_name cannot be empty".into()));
        }
        check_len("item_name", Some(&self.item_name), MAX_NAME_LEN)?;
        check_len("image_url", self.image_url.as_deref(), MAX_IMAGE_URL_LEN)?;
        check_len("culture", self.culture.as_deref(), MAX_NAME_LEN)?;
        check_len("object_date", self.object_date.as_deref(), MAX_NAME_LEN)?;
        Ok(())
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), Error> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(Error::InvalidInput(format!("{field} too long: max {max} characters")))
        }
        _ => Ok(()),
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, artifact_id, item_name, source, image_url, culture,
    object_date, notes, created_at, updated_at FROM favorites";

fn favorite_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: row.get(0)?,
        user_id: row.get(1)?,
        artifact_id: row.get(2)?,
        item_name: row.get(3)?,
        source: row.get(4)?,
        image_url: row.get(5)?,
        culture: row.get(6)?,
        object_date: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Fails with NotFound or Forbidden unless favorite `id` belongs to `user_id`.
fn check_owner(conn: &rusqlite::Connection, user_id: &str, id: i64) -> Result<(), Error> {
    let owner: Result<String, _> =
        conn.query_row("SELECT user_id FROM favorites WHERE id = ?1", params![id], |row| row.get(0));

    match owner {
        Ok(owner) if owner == user_id => Ok(()),
        Ok(_) => Err(Error::Forbidden(format!("favorite {id}"))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(format!("favorite {id}"))),
        Err(e) => Err(e.into()),
    }
}

impl CacheDb {
    /// Add a favorite unless the user already has this artifact.
    pub async fn add_favorite(&self, new: NewFavorite) -> Result<FavoriteOutcome, Error> {
        new.validate()?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<FavoriteOutcome, Error> {
                let inserted = conn.execute(
                    "INSERT INTO favorites (
                        user_id, artifact_id, item_name, source, image_url, culture, object_date,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                    ON CONFLICT(user_id, artifact_id) DO NOTHING",
                    params![
                        &new.user_id,
                        &new.artifact_id,
                        &new.item_name,
                        &new.source,
                        &new.image_url,
                        &new.culture,
                        &new.object_date,
                        &now,
                    ],
                )?;

                let favorite = conn.query_row(
                    &format!("{SELECT_COLUMNS} WHERE user_id = ?1 AND artifact_id = ?2"),
                    params![&new.user_id, &new.artifact_id],
                    favorite_from_row,
                )?;

                if inserted == 0 {
                    Ok(FavoriteOutcome::AlreadyExists(favorite))
                } else {
                    Ok(FavoriteOutcome::Added(favorite))
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List a user's favorites, oldest first.
    pub async fn list_favorites(&self, user_id: &str) -> Result<Vec<Favorite>, Error> {
        let user_id = user_id.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Favorite>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY id ASC"))?;
                let rows = stmt.query_map(params![user_id], favorite_from_row)?;
                let favorites = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(favorites)
            })
            .await
            .map_err(Error::from)
    }

    /// Replace the notes on one of the user's favorites.
    pub async fn update_favorite_notes(
        &self, user_id: &str, id: i64, notes: Option<String>,
    ) -> Result<Favorite, Error> {
        check_len("notes", notes.as_deref(), MAX_NOTES_LEN)?;
        let user_id = user_id.to_string();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<Favorite, Error> {
                check_owner(conn, &user_id, id)?;
                conn.execute(
                    "UPDATE favorites SET notes = ?1, updated_at = ?2 WHERE id = ?3",
                    params![notes, now, id],
                )?;
                let favorite =
                    conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], favorite_from_row)?;
                Ok(favorite)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one of the user's favorites.
    pub async fn remove_favorite(&self, user_id: &str, id: i64) -> Result<(), Error> {
        let user_id = user_id.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                check_owner(conn, &user_id, id)?;
                conn.execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
