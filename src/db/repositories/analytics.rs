//! Materialized analytics tables.
//!
//! Every table here is derived data. Full refreshes rebuild all of them in a
//! single transaction; rating writes rebuild just one battler's rows through
//! [`refresh_battler`] on the writer's transaction.

use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement, TransactionTrait, Value, sea_query::OnConflict,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::catalog::{Attribute, load_attributes};
use super::role_weight::load_weights;
use crate::domain::scoring::score_card;
use crate::domain::{AttributeRef, Category, Role, RoleAverage, RoleWeights, ScoreCard};
use crate::entities::{
    analytics_refreshes, badge_frequency, battler_attribute_scores, battler_scores, battlers,
    rating_distribution, role_activity,
};

pub const VIEW_BATTLER_SCORES: &str = "battler_scores";
pub const VIEW_ATTRIBUTE_SCORES: &str = "battler_attribute_scores";
pub const VIEW_BADGE_FREQUENCY: &str = "badge_frequency";
pub const VIEW_RATING_DISTRIBUTION: &str = "rating_distribution";
pub const VIEW_ROLE_ACTIVITY: &str = "role_activity";

#[derive(Debug, FromQueryResult)]
struct RoleAverageRow {
    battler_id: i32,
    attribute_id: i32,
    role: String,
    average: f64,
    rating_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RaterRow {
    battler_id: i32,
    rating_count: i64,
    rater_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct BadgeCountRow {
    badge_id: i32,
    name: String,
    category: String,
    is_positive: bool,
    assignment_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct BucketRow {
    attribute_id: i32,
    bucket: i32,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RoleRatingRow {
    role: String,
    rating_count: i64,
    rater_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RoleBadgeRow {
    role: String,
    badge_count: i64,
}

/// Per-role averages for one battler and attribute, as shown in breakdowns.
#[derive(Debug, Clone, Serialize)]
pub struct RoleBreakdown {
    pub role: Role,
    pub average: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewRefresh {
    pub view: String,
    pub row_count: i64,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub views: Vec<ViewRefresh>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub view: String,
    pub refreshed_at: String,
    pub duration_ms: i64,
    pub row_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeFrequency {
    pub badge_id: i32,
    pub name: String,
    pub category: String,
    pub is_positive: bool,
    pub assignment_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionBucket {
    pub attribute_id: i32,
    pub bucket: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleActivity {
    pub role: String,
    pub rating_count: i64,
    pub rater_count: i64,
    pub badge_count: i64,
}

const ROLE_AVERAGES_SQL: &str = "SELECT r.battler_id AS battler_id, r.attribute_id AS attribute_id, \
     u.role AS role, AVG(r.score) AS average, COUNT(*) AS rating_count \
     FROM battler_ratings r INNER JOIN users u ON u.id = r.user_id";

const RATERS_SQL: &str = "SELECT battler_id, COUNT(*) AS rating_count, \
     COUNT(DISTINCT user_id) AS rater_count FROM battler_ratings";

async fn role_average_rows<C: ConnectionTrait>(
    conn: &C,
    battler_id: Option<i32>,
) -> Result<Vec<RoleAverageRow>> {
    let backend = conn.get_database_backend();
    let stmt = match battler_id {
        Some(id) => Statement::from_sql_and_values(
            backend,
            format!(
                "{ROLE_AVERAGES_SQL} WHERE r.battler_id = ? \
                 GROUP BY r.battler_id, r.attribute_id, u.role"
            ),
            [Value::from(id)],
        ),
        None => Statement::from_string(
            backend,
            format!("{ROLE_AVERAGES_SQL} GROUP BY r.battler_id, r.attribute_id, u.role"),
        ),
    };

    RoleAverageRow::find_by_statement(stmt)
        .all(conn)
        .await
        .context("Failed to aggregate role averages")
}

async fn rater_rows<C: ConnectionTrait>(
    conn: &C,
    battler_id: Option<i32>,
) -> Result<Vec<RaterRow>> {
    let backend = conn.get_database_backend();
    let stmt = match battler_id {
        Some(id) => Statement::from_sql_and_values(
            backend,
            format!("{RATERS_SQL} WHERE battler_id = ? GROUP BY battler_id"),
            [Value::from(id)],
        ),
        None => Statement::from_string(backend, format!("{RATERS_SQL} GROUP BY battler_id")),
    };

    Ok(RaterRow::find_by_statement(stmt).all(conn).await?)
}

/// Role averages keyed by battler, then attribute.
type AverageIndex = HashMap<i32, HashMap<i32, Vec<RoleAverage>>>;
/// Rating counts keyed by (battler, attribute).
type CountIndex = HashMap<(i32, i32), i64>;

fn index_averages(rows: Vec<RoleAverageRow>) -> (AverageIndex, CountIndex) {
    let mut averages: AverageIndex = HashMap::new();
    let mut counts: CountIndex = HashMap::new();

    for row in rows {
        *counts.entry((row.battler_id, row.attribute_id)).or_default() += row.rating_count;

        let role = match row.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!(role = %row.role, error = %e, "Skipping ratings from unknown role");
                continue;
            }
        };

        averages
            .entry(row.battler_id)
            .or_default()
            .entry(row.attribute_id)
            .or_default()
            .push(RoleAverage {
                role,
                average: row.average,
            });
    }

    (averages, counts)
}

struct BattlerRows {
    attribute_rows: Vec<battler_attribute_scores::ActiveModel>,
    score_row: battler_scores::ActiveModel,
}

fn battler_rows(
    battler_id: i32,
    card: &ScoreCard,
    counts: &CountIndex,
    raters: Option<&RaterRow>,
    now: &str,
) -> BattlerRows {
    let attribute_rows = card
        .attributes
        .iter()
        .map(|(attribute_id, score)| battler_attribute_scores::ActiveModel {
            battler_id: Set(battler_id),
            attribute_id: Set(*attribute_id),
            score: Set(*score),
            rating_count: Set(counts
                .get(&(battler_id, *attribute_id))
                .copied()
                .unwrap_or(0)),
        })
        .collect();

    let score_row = battler_scores::ActiveModel {
        battler_id: Set(battler_id),
        writing: Set(card.writing),
        performance: Set(card.performance),
        personal: Set(card.personal),
        total: Set(card.total),
        rating_count: Set(raters.map_or(0, |r| r.rating_count)),
        rater_count: Set(raters.map_or(0, |r| r.rater_count)),
        refreshed_at: Set(now.to_string()),
    };

    BattlerRows {
        attribute_rows,
        score_row,
    }
}

fn attribute_refs(attributes: &[Attribute]) -> Vec<AttributeRef> {
    attributes.iter().map(Attribute::attribute_ref).collect()
}

/// Recomputes one battler's score rows on the given connection.
///
/// Callers that modify ratings pass their open transaction so the rating
/// write and the aggregate rows commit together.
pub async fn refresh_battler<C: ConnectionTrait>(conn: &C, battler_id: i32) -> Result<ScoreCard> {
    let weights = load_weights(conn).await?;
    let attributes = attribute_refs(&load_attributes(conn).await?);

    let (mut averages, counts) = index_averages(role_average_rows(conn, Some(battler_id)).await?);
    let raters = rater_rows(conn, Some(battler_id)).await?;

    let card = score_card(
        &attributes,
        &averages.remove(&battler_id).unwrap_or_default(),
        &weights,
    );
    let rows = battler_rows(battler_id, &card, &counts, raters.first(), &now());

    battler_attribute_scores::Entity::delete_many()
        .filter(battler_attribute_scores::Column::BattlerId.eq(battler_id))
        .exec(conn)
        .await?;
    if !rows.attribute_rows.is_empty() {
        battler_attribute_scores::Entity::insert_many(rows.attribute_rows)
            .exec_without_returning(conn)
            .await?;
    }

    battler_scores::Entity::insert(rows.score_row)
        .on_conflict(
            OnConflict::column(battler_scores::Column::BattlerId)
                .update_columns([
                    battler_scores::Column::Writing,
                    battler_scores::Column::Performance,
                    battler_scores::Column::Personal,
                    battler_scores::Column::Total,
                    battler_scores::Column::RatingCount,
                    battler_scores::Column::RaterCount,
                    battler_scores::Column::RefreshedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    debug!(battler_id, total = ?card.total, "Refreshed battler scores");
    Ok(card)
}

/// Recomputes the frequency row of a single badge.
pub async fn refresh_badge<C: ConnectionTrait>(conn: &C, badge_id: i32) -> Result<i64> {
    let backend = conn.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        format!("{BADGE_FREQUENCY_SQL} WHERE b.id = ? GROUP BY b.id, b.name, b.category, b.is_positive"),
        [Value::from(badge_id)],
    );

    let Some(row) = BadgeCountRow::find_by_statement(stmt).one(conn).await? else {
        badge_frequency::Entity::delete_by_id(badge_id).exec(conn).await?;
        return Ok(0);
    };

    let count = row.assignment_count;
    badge_frequency::Entity::insert(badge_row(row))
        .on_conflict(
            OnConflict::column(badge_frequency::Column::BadgeId)
                .update_columns([
                    badge_frequency::Column::Name,
                    badge_frequency::Column::Category,
                    badge_frequency::Column::IsPositive,
                    badge_frequency::Column::AssignmentCount,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(count)
}

const BADGE_FREQUENCY_SQL: &str = "SELECT b.id AS badge_id, b.name AS name, \
     b.category AS category, b.is_positive AS is_positive, \
     COUNT(bb.badge_id) AS assignment_count \
     FROM badges b LEFT JOIN battler_badges bb ON bb.badge_id = b.id";

fn badge_row(row: BadgeCountRow) -> badge_frequency::ActiveModel {
    badge_frequency::ActiveModel {
        badge_id: Set(row.badge_id),
        name: Set(row.name),
        category: Set(row.category),
        is_positive: Set(row.is_positive),
        assignment_count: Set(row.assignment_count),
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn elapsed_ms(start: Instant) -> i64 {
    i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX)
}

async fn rebuild_scores<C: ConnectionTrait>(
    conn: &C,
    weights: &RoleWeights,
    attributes: &[AttributeRef],
) -> Result<(i64, i64)> {
    let battler_ids: Vec<i32> = battlers::Entity::find()
        .select_only()
        .column(battlers::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;

    let (mut averages, counts) = index_averages(role_average_rows(conn, None).await?);
    let raters: HashMap<i32, RaterRow> = rater_rows(conn, None)
        .await?
        .into_iter()
        .map(|row| (row.battler_id, row))
        .collect();

    let stamp = now();
    let mut attribute_rows = Vec::new();
    let mut score_rows = Vec::with_capacity(battler_ids.len());

    for battler_id in battler_ids {
        let card = score_card(
            attributes,
            &averages.remove(&battler_id).unwrap_or_default(),
            weights,
        );
        let rows = battler_rows(battler_id, &card, &counts, raters.get(&battler_id), &stamp);
        attribute_rows.extend(rows.attribute_rows);
        score_rows.push(rows.score_row);
    }

    battler_attribute_scores::Entity::delete_many().exec(conn).await?;
    battler_scores::Entity::delete_many().exec(conn).await?;

    let attribute_count = attribute_rows.len() as i64;
    let score_count = score_rows.len() as i64;

    // SQLite caps bound parameters per statement
    for chunk in attribute_rows.chunks(200) {
        battler_attribute_scores::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(conn)
            .await?;
    }
    for chunk in score_rows.chunks(100) {
        battler_scores::Entity::insert_many(chunk.to_vec())
            .exec_without_returning(conn)
            .await?;
    }

    Ok((score_count, attribute_count))
}

async fn rebuild_badge_frequency<C: ConnectionTrait>(conn: &C) -> Result<i64> {
    let backend = conn.get_database_backend();
    let rows = BadgeCountRow::find_by_statement(Statement::from_string(
        backend,
        format!("{BADGE_FREQUENCY_SQL} GROUP BY b.id, b.name, b.category, b.is_positive"),
    ))
    .all(conn)
    .await?;

    badge_frequency::Entity::delete_many().exec(conn).await?;
    let count = rows.len() as i64;
    if !rows.is_empty() {
        badge_frequency::Entity::insert_many(rows.into_iter().map(badge_row))
            .exec_without_returning(conn)
            .await?;
    }
    Ok(count)
}

async fn rebuild_rating_distribution<C: ConnectionTrait>(conn: &C) -> Result<i64> {
    let backend = conn.get_database_backend();
    let rows = BucketRow::find_by_statement(Statement::from_string(
        backend,
        "SELECT attribute_id, CAST(score AS INTEGER) AS bucket, COUNT(*) AS count \
         FROM battler_ratings GROUP BY attribute_id, CAST(score AS INTEGER)"
            .to_string(),
    ))
    .all(conn)
    .await?;

    rating_distribution::Entity::delete_many().exec(conn).await?;
    let count = rows.len() as i64;
    if !rows.is_empty() {
        rating_distribution::Entity::insert_many(rows.into_iter().map(|row| {
            rating_distribution::ActiveModel {
                attribute_id: Set(row.attribute_id),
                bucket: Set(row.bucket),
                count: Set(row.count),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }
    Ok(count)
}

async fn rebuild_role_activity<C: ConnectionTrait>(conn: &C) -> Result<i64> {
    let backend = conn.get_database_backend();

    let ratings: HashMap<String, RoleRatingRow> =
        RoleRatingRow::find_by_statement(Statement::from_string(
            backend,
            "SELECT u.role AS role, COUNT(*) AS rating_count, \
             COUNT(DISTINCT r.user_id) AS rater_count \
             FROM battler_ratings r INNER JOIN users u ON u.id = r.user_id GROUP BY u.role"
                .to_string(),
        ))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.role.clone(), row))
        .collect();

    let badges: HashMap<String, i64> = RoleBadgeRow::find_by_statement(Statement::from_string(
        backend,
        "SELECT u.role AS role, COUNT(*) AS badge_count \
         FROM battler_badges bb INNER JOIN users u ON u.id = bb.user_id GROUP BY u.role"
            .to_string(),
    ))
    .all(conn)
    .await?
    .into_iter()
    .map(|row| (row.role, row.badge_count))
    .collect();

    let rows: Vec<role_activity::ActiveModel> = Role::ALL
        .iter()
        .map(|role| {
            let key = role.as_str();
            let rating = ratings.get(key);
            role_activity::ActiveModel {
                role: Set(key.to_string()),
                rating_count: Set(rating.map_or(0, |r| r.rating_count)),
                rater_count: Set(rating.map_or(0, |r| r.rater_count)),
                badge_count: Set(badges.get(key).copied().unwrap_or(0)),
            }
        })
        .collect();

    role_activity::Entity::delete_many().exec(conn).await?;
    let count = rows.len() as i64;
    role_activity::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(count)
}

async fn record_refresh<C: ConnectionTrait>(conn: &C, refresh: &ViewRefresh, at: &str) -> Result<()> {
    analytics_refreshes::Entity::insert(analytics_refreshes::ActiveModel {
        view_name: Set(refresh.view.clone()),
        refreshed_at: Set(at.to_string()),
        duration_ms: Set(refresh.duration_ms),
        row_count: Set(refresh.row_count),
    })
    .on_conflict(
        OnConflict::column(analytics_refreshes::Column::ViewName)
            .update_columns([
                analytics_refreshes::Column::RefreshedAt,
                analytics_refreshes::Column::DurationMs,
                analytics_refreshes::Column::RowCount,
            ])
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

impl AnalyticsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Rebuilds every materialized table in one transaction.
    pub async fn refresh_all(&self) -> Result<RefreshReport> {
        let started = Instant::now();
        let txn = self.conn.begin().await?;

        let weights = load_weights(&txn).await?;
        let attributes = attribute_refs(&load_attributes(&txn).await?);

        let mut views = Vec::with_capacity(5);

        let step = Instant::now();
        let (score_rows, attribute_rows) = rebuild_scores(&txn, &weights, &attributes).await?;
        let scores_ms = elapsed_ms(step);
        views.push(ViewRefresh {
            view: VIEW_BATTLER_SCORES.to_string(),
            row_count: score_rows,
            duration_ms: scores_ms,
        });
        views.push(ViewRefresh {
            view: VIEW_ATTRIBUTE_SCORES.to_string(),
            row_count: attribute_rows,
            duration_ms: scores_ms,
        });

        let step = Instant::now();
        let row_count = rebuild_badge_frequency(&txn).await?;
        views.push(ViewRefresh {
            view: VIEW_BADGE_FREQUENCY.to_string(),
            row_count,
            duration_ms: elapsed_ms(step),
        });

        let step = Instant::now();
        let row_count = rebuild_rating_distribution(&txn).await?;
        views.push(ViewRefresh {
            view: VIEW_RATING_DISTRIBUTION.to_string(),
            row_count,
            duration_ms: elapsed_ms(step),
        });

        let step = Instant::now();
        let row_count = rebuild_role_activity(&txn).await?;
        views.push(ViewRefresh {
            view: VIEW_ROLE_ACTIVITY.to_string(),
            row_count,
            duration_ms: elapsed_ms(step),
        });

        let at = now();
        for view in &views {
            record_refresh(&txn, view, &at).await?;
        }

        txn.commit().await?;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            event = "analytics_refreshed",
            views = views.len(),
            duration_ms,
            "Refreshed analytics views"
        );

        Ok(RefreshReport { views, duration_ms })
    }

    pub async fn refresh_battler(&self, battler_id: i32) -> Result<ScoreCard> {
        let txn = self.conn.begin().await?;
        let card = refresh_battler(&txn, battler_id).await?;
        txn.commit().await?;
        Ok(card)
    }

    pub async fn battler_score(&self, battler_id: i32) -> Result<Option<battler_scores::Model>> {
        Ok(battler_scores::Entity::find_by_id(battler_id)
            .one(&self.conn)
            .await?)
    }

    pub async fn battler_scores_for(
        &self,
        battler_ids: &[i32],
    ) -> Result<HashMap<i32, battler_scores::Model>> {
        if battler_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = battler_scores::Entity::find()
            .filter(battler_scores::Column::BattlerId.is_in(battler_ids.iter().copied()))
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(|r| (r.battler_id, r)).collect())
    }

    pub async fn attribute_scores(&self, battler_id: i32) -> Result<BTreeMap<i32, (Option<f64>, i64)>> {
        let rows = battler_attribute_scores::Entity::find()
            .filter(battler_attribute_scores::Column::BattlerId.eq(battler_id))
            .all(&self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.attribute_id, (r.score, r.rating_count)))
            .collect())
    }

    /// Per-role averages of one battler, keyed by attribute.
    pub async fn role_breakdown(&self, battler_id: i32) -> Result<HashMap<i32, Vec<RoleBreakdown>>> {
        let rows = role_average_rows(&self.conn, Some(battler_id)).await?;

        let mut map: HashMap<i32, Vec<RoleBreakdown>> = HashMap::new();
        for row in rows {
            let Ok(role) = row.role.parse::<Role>() else {
                continue;
            };
            map.entry(row.attribute_id).or_default().push(RoleBreakdown {
                role,
                average: row.average,
                rating_count: row.rating_count,
            });
        }
        for entries in map.values_mut() {
            entries.sort_by_key(|e| e.role);
        }
        Ok(map)
    }

    /// Battlers ordered by score, highest first.
    ///
    /// Undefined scores sort last; ties break on rating count, then name.
    pub async fn ranked(
        &self,
        category: Option<Category>,
        min_ratings: i64,
        limit: u64,
    ) -> Result<Vec<(battler_scores::Model, String)>> {
        let rows: Vec<(battler_scores::Model, Option<battlers::Model>)> =
            battler_scores::Entity::find()
                .find_also_related(battlers::Entity)
                .filter(battler_scores::Column::RatingCount.gte(min_ratings))
                .all(&self.conn)
                .await?;

        let mut ranked: Vec<(battler_scores::Model, String)> = rows
            .into_iter()
            .filter_map(|(score, battler)| battler.map(|b| (score, b.name)))
            .filter(|(score, _)| score_for(score, category).is_some())
            .collect();

        ranked.sort_by(|(a, a_name), (b, b_name)| {
            let a_score = score_for(a, category).unwrap_or(f64::MIN);
            let b_score = score_for(b, category).unwrap_or(f64::MIN);
            b_score
                .total_cmp(&a_score)
                .then_with(|| b.rating_count.cmp(&a.rating_count))
                .then_with(|| a_name.cmp(b_name))
        });

        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    pub async fn badge_frequency(&self) -> Result<Vec<BadgeFrequency>> {
        let rows = badge_frequency::Entity::find()
            .order_by_desc(badge_frequency::Column::AssignmentCount)
            .order_by_asc(badge_frequency::Column::Name)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| BadgeFrequency {
                badge_id: r.badge_id,
                name: r.name,
                category: r.category,
                is_positive: r.is_positive,
                assignment_count: r.assignment_count,
            })
            .collect())
    }

    pub async fn badge_count(&self, badge_id: i32) -> Result<i64> {
        Ok(badge_frequency::Entity::find_by_id(badge_id)
            .one(&self.conn)
            .await?
            .map_or(0, |r| r.assignment_count))
    }

    pub async fn rating_distribution(
        &self,
        attribute_id: Option<i32>,
    ) -> Result<Vec<DistributionBucket>> {
        let mut query = rating_distribution::Entity::find();
        if let Some(id) = attribute_id {
            query = query.filter(rating_distribution::Column::AttributeId.eq(id));
        }

        let rows = query
            .order_by_asc(rating_distribution::Column::AttributeId)
            .order_by_asc(rating_distribution::Column::Bucket)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DistributionBucket {
                attribute_id: r.attribute_id,
                bucket: r.bucket,
                count: r.count,
            })
            .collect())
    }

    pub async fn role_activity(&self) -> Result<Vec<RoleActivity>> {
        let rows = role_activity::Entity::find()
            .order_by_desc(role_activity::Column::RatingCount)
            .order_by_asc(role_activity::Column::Role)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| RoleActivity {
                role: r.role,
                rating_count: r.rating_count,
                rater_count: r.rater_count,
                badge_count: r.badge_count,
            })
            .collect())
    }

    pub async fn refresh_status(&self) -> Result<Vec<RefreshStatus>> {
        let rows = analytics_refreshes::Entity::find()
            .order_by_asc(analytics_refreshes::Column::ViewName)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| RefreshStatus {
                view: r.view_name,
                refreshed_at: r.refreshed_at,
                duration_ms: r.duration_ms,
                row_count: r.row_count,
            })
            .collect())
    }

    pub async fn last_refresh(&self) -> Result<Option<String>> {
        let row = analytics_refreshes::Entity::find()
            .order_by_desc(analytics_refreshes::Column::RefreshedAt)
            .one(&self.conn)
            .await?;
        Ok(row.map(|r| r.refreshed_at))
    }
}

/// Score a battler is ranked by; the total when no category is given.
#[must_use]
pub const fn score_for(row: &battler_scores::Model, category: Option<Category>) -> Option<f64> {
    match category {
        None => row.total,
        Some(Category::Writing) => row.writing,
        Some(Category::Performance) => row.performance,
        Some(Category::Personal) => row.personal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::{RatingEntry, Store};
    use crate::models::battler::BattlerInput;

    async fn user(store: &Store, username: &str, role: Role) -> i32 {
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        store
            .user_repo()
            .create(username, "password123", role, &security)
            .await
            .unwrap()
            .id
    }

    async fn battler(store: &Store, name: &str) -> i32 {
        let input = BattlerInput {
            name: name.to_string(),
            ..BattlerInput::default()
        };
        store.battler_repo().create(&input, None).await.unwrap().id
    }

    async fn attribute(store: &Store, category: Category) -> i32 {
        store
            .catalog_repo()
            .attributes()
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.category == category)
            .unwrap()
            .id
    }

    async fn rate(store: &Store, user_id: i32, battler_id: i32, attribute_id: i32, score: f64) {
        store
            .rating_repo()
            .upsert_many(user_id, battler_id, &[RatingEntry { attribute_id, score }])
            .await
            .unwrap();
    }

    fn names(ranked: &[(battler_scores::Model, String)]) -> Vec<&str> {
        ranked.iter().map(|(_, name)| name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_ranked_breaks_ties_on_rating_count_then_name() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.analytics_repo();
        let writing = attribute(&store, Category::Writing).await;
        let first = user(&store, "first", Role::Fan).await;
        let second = user(&store, "second", Role::Fan).await;

        let charlie = battler(&store, "Charlie").await;
        let alpha = battler(&store, "Alpha").await;
        let echo = battler(&store, "Echo").await;
        let bravo = battler(&store, "Bravo").await;
        battler(&store, "Delta").await;

        rate(&store, first, charlie, writing, 9.0).await;
        rate(&store, first, alpha, writing, 7.0).await;
        rate(&store, second, alpha, writing, 7.0).await;
        rate(&store, second, echo, writing, 7.0).await;
        rate(&store, first, bravo, writing, 7.0).await;

        let ranked = repo.ranked(None, 0, 10).await.unwrap();
        assert_eq!(names(&ranked), ["Charlie", "Alpha", "Bravo", "Echo"]);

        let ranked = repo.ranked(None, 2, 10).await.unwrap();
        assert_eq!(names(&ranked), ["Alpha"]);

        let ranked = repo.ranked(None, 0, 2).await.unwrap();
        assert_eq!(names(&ranked), ["Charlie", "Alpha"]);
    }

    #[tokio::test]
    async fn test_ranked_by_category_skips_unscored() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.analytics_repo();
        let writing = attribute(&store, Category::Writing).await;
        let performance = attribute(&store, Category::Performance).await;
        let fan = user(&store, "fan", Role::Fan).await;

        let alpha = battler(&store, "Alpha").await;
        let bravo = battler(&store, "Bravo").await;
        rate(&store, fan, alpha, performance, 8.0).await;
        rate(&store, fan, bravo, writing, 9.0).await;

        let ranked = repo.ranked(Some(Category::Performance), 0, 10).await.unwrap();
        assert_eq!(names(&ranked), ["Alpha"]);

        let ranked = repo.ranked(Some(Category::Writing), 0, 10).await.unwrap();
        assert_eq!(names(&ranked), ["Bravo"]);
        assert!(repo.ranked(Some(Category::Personal), 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_all_rebuilds_every_view() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.analytics_repo();
        let writing = attribute(&store, Category::Writing).await;
        let fan = user(&store, "fan", Role::Fan).await;
        let media = user(&store, "media", Role::Media).await;
        let target = battler(&store, "Target").await;
        let badge_id = store.catalog_repo().badges().await.unwrap()[0].id;

        rate(&store, fan, target, writing, 8.0).await;
        rate(&store, media, target, writing, 4.0).await;
        store.badge_repo().toggle(fan, target, badge_id).await.unwrap();

        assert!(repo.refresh_status().await.unwrap().is_empty());
        assert!(repo.last_refresh().await.unwrap().is_none());

        let report = repo.refresh_all().await.unwrap();
        let views: Vec<&str> = report.views.iter().map(|v| v.view.as_str()).collect();
        assert_eq!(
            views,
            [
                VIEW_BATTLER_SCORES,
                VIEW_ATTRIBUTE_SCORES,
                VIEW_BADGE_FREQUENCY,
                VIEW_RATING_DISTRIBUTION,
                VIEW_ROLE_ACTIVITY,
            ]
        );
        assert_eq!(repo.refresh_status().await.unwrap().len(), 5);
        assert!(repo.last_refresh().await.unwrap().is_some());

        let total = repo.battler_score(target).await.unwrap().unwrap().total.unwrap();
        assert!((total - (8.0 + 4.0 * 2.0) / 3.0).abs() < 1e-9);

        let buckets = repo.rating_distribution(Some(writing)).await.unwrap();
        let buckets: Vec<(i32, i64)> = buckets.iter().map(|b| (b.bucket, b.count)).collect();
        assert_eq!(buckets, [(4, 1), (8, 1)]);

        let frequency = repo.badge_frequency().await.unwrap();
        assert_eq!(frequency[0].badge_id, badge_id);
        assert_eq!(frequency[0].assignment_count, 1);
        assert!(frequency[1..].iter().all(|b| b.assignment_count == 0));

        let activity = repo.role_activity().await.unwrap();
        assert_eq!(activity.len(), Role::ALL.len());
        let fan_row = activity.iter().find(|a| a.role == "fan").unwrap();
        assert_eq!((fan_row.rating_count, fan_row.rater_count, fan_row.badge_count), (1, 1, 1));
        let media_row = activity.iter().find(|a| a.role == "media").unwrap();
        assert_eq!((media_row.rating_count, media_row.badge_count), (1, 0));
        let admin_row = activity.iter().find(|a| a.role == "admin").unwrap();
        assert_eq!(admin_row.rating_count, 0);
    }

    #[tokio::test]
    async fn test_refresh_all_applies_new_weights() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.analytics_repo();
        let writing = attribute(&store, Category::Writing).await;
        let fan = user(&store, "fan", Role::Fan).await;
        let media = user(&store, "media", Role::Media).await;
        let target = battler(&store, "Target").await;

        rate(&store, fan, target, writing, 8.0).await;
        rate(&store, media, target, writing, 4.0).await;

        store
            .role_weight_repo()
            .save(&RoleWeights::from_pairs([(Role::Media, 0.0)]))
            .await
            .unwrap();
        repo.refresh_all().await.unwrap();

        let total = repo.battler_score(target).await.unwrap().unwrap().total.unwrap();
        assert!((total - 8.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_role_breakdown_groups_by_attribute() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let writing = attribute(&store, Category::Writing).await;
        let fan = user(&store, "fan", Role::Fan).await;
        let other = user(&store, "other", Role::Fan).await;
        let admin = user(&store, "boss", Role::Admin).await;
        let target = battler(&store, "Target").await;

        rate(&store, fan, target, writing, 6.0).await;
        rate(&store, other, target, writing, 7.0).await;
        rate(&store, admin, target, writing, 9.0).await;

        let breakdown = store.analytics_repo().role_breakdown(target).await.unwrap();
        let rows = &breakdown[&writing];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, Role::Fan);
        assert_eq!(rows[0].rating_count, 2);
        assert!((rows[0].average - 6.5).abs() < 1e-9);
        assert_eq!(rows[1].role, Role::Admin);
    }
}
