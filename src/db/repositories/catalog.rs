use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder};
use serde::Serialize;
use tracing::warn;

use crate::domain::{AttributeRef, Category};
use crate::entities::{attributes, badges};

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub id: i32,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl Attribute {
    #[must_use]
    pub const fn attribute_ref(&self) -> AttributeRef {
        AttributeRef {
            id: self.id,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub id: i32,
    pub name: String,
    pub category: Category,
    pub is_positive: bool,
    pub description: Option<String>,
}

fn parse_category(raw: &str, what: &str, id: i32) -> Option<Category> {
    match raw.parse() {
        Ok(category) => Some(category),
        Err(e) => {
            warn!(id, kind = what, error = %e, "Skipping row with unknown category");
            None
        }
    }
}

/// Loads the attribute catalog on any connection, including open transactions.
pub async fn load_attributes<C: ConnectionTrait>(conn: &C) -> Result<Vec<Attribute>> {
    let rows = attributes::Entity::find()
        .order_by_asc(attributes::Column::SortOrder)
        .order_by_asc(attributes::Column::Id)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let category = parse_category(&row.category, "attribute", row.id)?;
            Some(Attribute {
                id: row.id,
                name: row.name,
                category,
                description: row.description,
                sort_order: row.sort_order,
            })
        })
        .collect())
}

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn attributes(&self) -> Result<Vec<Attribute>> {
        load_attributes(&self.conn).await
    }

    pub async fn badges(&self) -> Result<Vec<Badge>> {
        let rows = badges::Entity::find()
            .order_by_asc(badges::Column::Category)
            .order_by_desc(badges::Column::IsPositive)
            .order_by_asc(badges::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let category = parse_category(&row.category, "badge", row.id)?;
                Some(Badge {
                    id: row.id,
                    name: row.name,
                    category,
                    is_positive: row.is_positive,
                    description: row.description,
                })
            })
            .collect())
    }

    pub async fn badge_exists(&self, id: i32) -> Result<bool> {
        Ok(badges::Entity::find_by_id(id).one(&self.conn).await?.is_some())
    }
}
