use super::types::Database;
use crate::inventory::{Operand, Operator, PredicateSet, QueryExecutor, Window};
use anyhow::Result;
use async_trait::async_trait;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// A dedicated-server listing. Every descriptive field is free text; `hdd` may be
/// a composite descriptor like `2x250GB SATA2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, Object)]
pub struct ServerListing {
    pub id: String,
    pub model: String,
    pub ram: String,
    pub hdd: String,
    pub location: String,
    pub price: String,
    pub created_at_ns: i64,
    pub updated_at_ns: i64,
}

const SELECT_SERVERS: &str = "SELECT id, model, ram, hdd, location, price, created_at_ns, updated_at_ns FROM servers";

impl Database {
    /// Insert a listing, or replace the descriptive fields of an existing one.
    /// `created_at_ns` of an existing row is preserved.
    pub async fn upsert_listing(&self, listing: &ServerListing) -> Result<()> {
        sqlx::query(
            "INSERT INTO servers (id, model, ram, hdd, location, price, created_at_ns, updated_at_ns)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                model = excluded.model,
                ram = excluded.ram,
                hdd = excluded.hdd,
                location = excluded.location,
                price = excluded.price,
                updated_at_ns = excluded.updated_at_ns",
        )
        .bind(&listing.id)
        .bind(&listing.model)
        .bind(&listing.ram)
        .bind(&listing.hdd)
        .bind(&listing.location)
        .bind(&listing.price)
        .bind(listing.created_at_ns)
        .bind(listing.updated_at_ns)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for Database {
    async fn list_all(&self, window: Option<Window>) -> Result<Vec<ServerListing>> {
        let listings = match window {
            Some(window) => {
                sqlx::query_as::<_, ServerListing>(&format!(
                    "{} ORDER BY id ASC LIMIT ? OFFSET ?",
                    SELECT_SERVERS
                ))
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ServerListing>(&format!("{} ORDER BY id ASC", SELECT_SERVERS))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(listings)
    }

    /// Substring predicates run in SQL with bound operands; capacity predicates
    /// are applied to the fetched rows, since SQLite cannot parse disk descriptors.
    async fn filtered(&self, predicates: &PredicateSet) -> Result<Vec<ServerListing>> {
        let mut clauses = Vec::new();
        let mut bind_values = Vec::new();
        for predicate in predicates {
            if let (Operator::Contains, Operand::Text(text)) =
                (&predicate.operator, &predicate.operand)
            {
                clauses.push(format!(
                    "instr(LOWER({}), LOWER(?)) > 0",
                    predicate.column.as_sql()
                ));
                bind_values.push(text.as_str());
            }
        }

        let mut query = String::from(SELECT_SERVERS);
        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }
        query.push_str(" ORDER BY id ASC");

        let mut query_builder = sqlx::query_as::<_, ServerListing>(&query);
        for value in bind_values {
            query_builder = query_builder.bind(value);
        }
        let rows = query_builder.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .filter(|listing| {
                predicates
                    .iter()
                    .filter(|p| !p.is_text_match())
                    .all(|p| p.matches(listing))
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.count_listings().await? as usize)
    }
}

#[cfg(test)]
mod tests;
