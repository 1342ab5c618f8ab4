use anyhow::Result;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
    sea_query::OnConflict,
};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::{Role, RoleWeights};
use crate::entities::role_weights;

/// Reads the stored weights. Roles without a row use their default weight.
pub async fn load_weights<C: ConnectionTrait>(conn: &C) -> Result<RoleWeights> {
    let rows = role_weights::Entity::find().all(conn).await?;

    let pairs = rows.into_iter().filter_map(|row| match row.role.parse::<Role>() {
        Ok(role) => Some((role, row.weight)),
        Err(e) => {
            warn!(role = %row.role, error = %e, "Ignoring weight for unknown role");
            None
        }
    });

    Ok(RoleWeights::from_pairs(pairs))
}

async fn upsert<C: ConnectionTrait>(conn: &C, role: Role, weight: f64, now: &str) -> Result<()> {
    role_weights::Entity::insert(role_weights::ActiveModel {
        role: Set(role.as_str().to_string()),
        weight: Set(weight),
        updated_at: Set(now.to_string()),
    })
    .on_conflict(
        OnConflict::column(role_weights::Column::Role)
            .update_columns([role_weights::Column::Weight, role_weights::Column::UpdatedAt])
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

pub struct RoleWeightRepository {
    conn: DatabaseConnection,
}

impl RoleWeightRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn load(&self) -> Result<RoleWeights> {
        load_weights(&self.conn).await
    }

    /// Writes every weight in one transaction and returns the stored set.
    pub async fn save(&self, weights: &RoleWeights) -> Result<RoleWeights> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        for (role, weight) in weights.iter() {
            upsert(&txn, role, weight, &now).await?;
        }

        let stored = load_weights(&txn).await?;
        txn.commit().await?;
        Ok(stored)
    }

    pub async fn reset(&self) -> Result<RoleWeights> {
        self.save(&RoleWeights::defaults()).await
    }

    /// Inserts a row for every role that has none yet, using `seed` as the
    /// weight. Stored weights are left alone. Returns the number of rows added.
    pub async fn seed_missing(&self, seed: &RoleWeights) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let present: HashSet<String> = role_weights::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.role)
            .collect();

        let mut added = 0;
        for (role, weight) in seed.iter() {
            if present.contains(role.as_str()) {
                continue;
            }
            upsert(&txn, role, weight, &now).await?;
            added += 1;
        }

        txn.commit().await?;
        if added > 0 {
            info!(event = "role_weights_seeded", added, "Seeded missing role weights");
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    #[tokio::test]
    async fn test_seed_missing_uses_configured_weights_once() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.role_weight_repo();

        let seed = RoleWeights::from_pairs([(Role::Fan, 1.5), (Role::Media, 4.0)]);
        assert_eq!(repo.seed_missing(&seed).await.unwrap(), Role::ALL.len());

        let stored = repo.load().await.unwrap();
        assert!((stored.get(Role::Fan) - 1.5).abs() < f64::EPSILON);
        assert!((stored.get(Role::Media) - 4.0).abs() < f64::EPSILON);
        assert!((stored.get(Role::Admin) - 5.0).abs() < f64::EPSILON);

        // Existing rows win over a later seed
        let other = RoleWeights::from_pairs([(Role::Fan, 9.0)]);
        assert_eq!(repo.seed_missing(&other).await.unwrap(), 0);
        assert!((repo.load().await.unwrap().get(Role::Fan) - 1.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reset_ignores_seed() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.role_weight_repo();

        repo.seed_missing(&RoleWeights::from_pairs([(Role::Battler, 0.5)]))
            .await
            .unwrap();
        let reset = repo.reset().await.unwrap();
        assert_eq!(reset, RoleWeights::defaults());
    }
}
