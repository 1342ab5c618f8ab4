//! Role-weighted rating aggregation.
//!
//! A battler's score for one attribute is the weighted mean of the per-role
//! average ratings: `Σ(avg_i × w_i) / Σ(w_i)`. Category scores are the plain
//! mean of the attribute scores in the category, and the total is the mean of
//! the category scores.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Category, Role};

/// Average rating given by all users of one role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleAverage {
    pub role: Role,
    pub average: f64,
}

/// Weight per role. Missing roles fall back to their documented default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights(BTreeMap<Role, f64>);

impl Default for RoleWeights {
    fn default() -> Self {
        Self::defaults()
    }
}

impl RoleWeights {
    #[must_use]
    pub fn defaults() -> Self {
        Self(
            Role::ALL
                .iter()
                .map(|role| (*role, role.default_weight()))
                .collect(),
        )
    }

    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Role, f64)>) -> Self {
        let mut weights = Self::defaults();
        for (role, weight) in pairs {
            weights.0.insert(role, weight);
        }
        weights
    }

    #[must_use]
    pub fn get(&self, role: Role) -> f64 {
        self.0
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_weight())
    }

    pub fn set(&mut self, role: Role, weight: f64) {
        self.0.insert(role, weight);
    }

    /// Restores every role to its documented default weight.
    pub fn reset(&mut self) {
        *self = Self::defaults();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, f64)> + '_ {
        self.0.iter().map(|(role, weight)| (*role, *weight))
    }
}

/// Returns `true` when `weight` may be stored as a role weight.
#[must_use]
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

/// Weighted mean of per-role averages.
///
/// Returns `None` when the weights of the present roles sum to zero,
/// which includes an empty input.
#[must_use]
pub fn weighted_score(averages: &[RoleAverage], weights: &RoleWeights) -> Option<f64> {
    let (weighted_sum, weight_total) =
        averages
            .iter()
            .fold((0.0_f64, 0.0_f64), |(sum, total), avg| {
                let weight = weights.get(avg.role);
                (sum + avg.average * weight, total + weight)
            });

    if weight_total > 0.0 {
        Some(weighted_sum / weight_total)
    } else {
        None
    }
}

/// Plain mean of the scores that are present.
#[must_use]
pub fn mean_of_present(scores: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0_u32), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

/// Score of one category: the mean of its attribute scores that are defined.
#[must_use]
pub fn category_score(attribute_scores: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    mean_of_present(attribute_scores)
}

/// Overall score: the mean of the defined category scores.
#[must_use]
pub fn total_score(category_scores: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    mean_of_present(category_scores)
}

/// Rounds a score to two decimal places.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Rounds a score for display; an undefined score is shown as zero.
#[must_use]
pub fn display_score(score: Option<f64>) -> f64 {
    score.map_or(0.0, round_score)
}

/// Attribute identity needed to roll scores up into categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRef {
    pub id: i32,
    pub category: Category,
}

/// Every computed score for one battler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreCard {
    pub attributes: BTreeMap<i32, Option<f64>>,
    pub writing: Option<f64>,
    pub performance: Option<f64>,
    pub personal: Option<f64>,
    pub total: Option<f64>,
}

impl ScoreCard {
    #[must_use]
    pub const fn category(&self, category: Category) -> Option<f64> {
        match category {
            Category::Writing => self.writing,
            Category::Performance => self.performance,
            Category::Personal => self.personal,
        }
    }
}

/// Builds a battler's score card from per-attribute role averages.
///
/// Attributes without ratings are absent from the category means rather
/// than counted as zero.
#[must_use]
pub fn score_card(
    attributes: &[AttributeRef],
    averages: &HashMap<i32, Vec<RoleAverage>>,
    weights: &RoleWeights,
) -> ScoreCard {
    let mut card = ScoreCard::default();

    for attribute in attributes {
        let score = averages
            .get(&attribute.id)
            .and_then(|role_avgs| weighted_score(role_avgs, weights));
        card.attributes.insert(attribute.id, score);
    }

    let rollup = |category: Category| {
        category_score(
            attributes
                .iter()
                .filter(|a| a.category == category)
                .map(|a| card.attributes.get(&a.id).copied().flatten()),
        )
    };

    card.writing = rollup(Category::Writing);
    card.performance = rollup(Category::Performance);
    card.personal = rollup(Category::Personal);
    card.total = total_score([card.writing, card.performance, card.personal]);
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avg(role: Role, average: f64) -> RoleAverage {
        RoleAverage { role, average }
    }

    #[test]
    fn test_weighted_score_matches_formula() {
        let weights = RoleWeights::defaults();
        let averages = [
            avg(Role::Fan, 8.0),
            avg(Role::Media, 6.0),
            avg(Role::Admin, 9.0),
        ];

        let expected = (8.0 * 1.0 + 6.0 * 2.0 + 9.0 * 5.0) / (1.0 + 2.0 + 5.0);
        let score = weighted_score(&averages, &weights).unwrap();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_score_with_custom_weights() {
        let weights = RoleWeights::from_pairs([(Role::Fan, 3.0), (Role::Battler, 1.0)]);
        let averages = [avg(Role::Fan, 4.0), avg(Role::Battler, 8.0)];

        let score = weighted_score(&averages, &weights).unwrap();
        assert!((score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_score_single_role_is_its_average() {
        let weights = RoleWeights::defaults();
        let score = weighted_score(&[avg(Role::LeagueOwner, 7.25)], &weights).unwrap();
        assert!((score - 7.25).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_score_undefined_when_weights_zero() {
        let weights = RoleWeights::from_pairs(Role::ALL.map(|r| (r, 0.0)));
        let averages = [avg(Role::Fan, 8.0), avg(Role::Admin, 2.0)];

        assert_eq!(weighted_score(&averages, &weights), None);
        assert_eq!(weighted_score(&[], &RoleWeights::defaults()), None);
        assert!(display_score(weighted_score(&averages, &weights)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_score_two_places() {
        assert!((round_score(20.0 / 3.0) - 6.67).abs() < 1e-9);
        assert!((round_score(7.125) - 7.13).abs() < 1e-9);
        assert!((display_score(Some(44.0 / 6.0)) - 7.33).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight_role_is_ignored() {
        let weights = RoleWeights::from_pairs([(Role::Fan, 0.0)]);
        let averages = [avg(Role::Fan, 1.0), avg(Role::Media, 9.0)];

        let score = weighted_score(&averages, &weights).unwrap();
        assert!((score - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_documented_defaults() {
        let mut weights = RoleWeights::from_pairs([(Role::Fan, 10.0), (Role::Admin, 0.5)]);
        weights.reset();

        assert!((weights.get(Role::Fan) - 1.0).abs() < f64::EPSILON);
        assert!((weights.get(Role::Media) - 2.0).abs() < f64::EPSILON);
        assert!((weights.get(Role::Battler) - 2.5).abs() < f64::EPSILON);
        assert!((weights.get(Role::LeagueOwner) - 3.0).abs() < f64::EPSILON);
        assert!((weights.get(Role::Admin) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_of_present() {
        assert_eq!(mean_of_present([Some(6.0), None, Some(8.0)]), Some(7.0));
        assert_eq!(mean_of_present([None, None]), None);
    }

    #[test]
    fn test_weight_validation() {
        assert!(is_valid_weight(0.0));
        assert!(is_valid_weight(2.5));
        assert!(!is_valid_weight(-1.0));
        assert!(!is_valid_weight(f64::NAN));
        assert!(!is_valid_weight(f64::INFINITY));
    }

    #[test]
    fn test_score_card_rolls_up_categories() {
        let attributes = [
            AttributeRef { id: 1, category: Category::Writing },
            AttributeRef { id: 2, category: Category::Writing },
            AttributeRef { id: 3, category: Category::Performance },
            AttributeRef { id: 4, category: Category::Personal },
        ];
        let mut averages = HashMap::new();
        averages.insert(1, vec![avg(Role::Fan, 6.0)]);
        averages.insert(2, vec![avg(Role::Fan, 8.0), avg(Role::Admin, 8.0)]);
        averages.insert(3, vec![avg(Role::Media, 5.0)]);

        let card = score_card(&attributes, &averages, &RoleWeights::defaults());

        assert_eq!(card.attributes.get(&4), Some(&None));
        assert_eq!(card.writing, Some(7.0));
        assert_eq!(card.performance, Some(5.0));
        assert_eq!(card.personal, None);
        assert_eq!(card.total, Some(6.0));
        assert_eq!(card.category(Category::Writing), Some(7.0));
    }

    #[test]
    fn test_score_card_without_ratings_is_undefined() {
        let attributes = [AttributeRef { id: 1, category: Category::Writing }];
        let card = score_card(&attributes, &HashMap::new(), &RoleWeights::defaults());
        assert_eq!(card.total, None);
        assert!(display_score(card.total).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_score_rounds() {
        assert!((display_score(Some(7.456)) - 7.46).abs() < 1e-9);
    }
}
