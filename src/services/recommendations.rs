//! Recommendation scorer: ranks unseen catalog items for a user from their
//! purchase history, with an optional boost from the currently viewed item.

use crate::{
    clients::ContentStore,
    errors::ServiceError,
    models::{Category, Order, Product, RecommendedProduct},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Maximum number of items a ranking request returns.
pub const MAX_RECOMMENDATIONS: usize = 6;

/// Score added per category shared with the currently viewed item.
const CATEGORY_MATCH_BOOST: f64 = 3.0;

/// Weight applied to the user's cumulative purchase count per category.
const FREQUENCY_WEIGHT: f64 = 0.5;

/// A candidate item with its transient relevance score. Exists only for the
/// duration of one ranking request and never crosses the API boundary.
#[derive(Debug)]
pub struct ScoredCandidate<'a> {
    pub product: &'a Product,
    pub score: f64,
}

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn ContentStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Ranks unseen catalog items for `user_id` and returns the top
    /// [`MAX_RECOMMENDATIONS`].
    ///
    /// When `current_item_id` is given, categories shared with that item are
    /// boosted; an id that does not resolve means "no boost", not an error.
    /// Read-only: the inputs are never mutated and nothing is persisted.
    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        user_id: &str,
        current_item_id: Option<&str>,
    ) -> Result<Vec<RecommendedProduct>, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "User ID is required".to_string(),
            ));
        }

        let history = self.store.fetch_orders_for_user(user_id).await?;

        let current_categories = match current_item_id {
            Some(id) => self
                .store
                .fetch_item_categories(id)
                .await?
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let catalog = self.store.fetch_products().await?;

        let ranked = rank(&catalog, &history, &current_categories);
        debug!(
            candidates = ranked.len(),
            "Ranked catalog for user {}", user_id
        );

        Ok(ranked
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|candidate| RecommendedProduct::from(candidate.product.clone()))
            .collect())
    }
}

/// Scores and sorts every catalog item the user has not already purchased.
///
/// Score per candidate is the sum over its categories of:
/// - [`CATEGORY_MATCH_BOOST`] when the category is shared with the (non-empty)
///   current item's category set, and
/// - [`FREQUENCY_WEIGHT`] times the user's cumulative purchased quantity in
///   that category.
///
/// Candidates are ordered score-descending; ties break on product id
/// ascending so identical inputs always yield an identical ordering.
pub fn rank<'a>(
    catalog: &'a [Product],
    history: &[Order],
    current_categories: &[Category],
) -> Vec<ScoredCandidate<'a>> {
    let mut category_frequency: HashMap<&str, i64> = HashMap::new();
    let mut purchased: HashSet<&str> = HashSet::new();

    for order in history {
        for line in &order.lines {
            purchased.insert(line.product.id.as_str());
            for category in &line.product.categories {
                *category_frequency.entry(category.id.as_str()).or_insert(0) += line.quantity;
            }
        }
    }

    let current_ids: HashSet<&str> = current_categories
        .iter()
        .map(|category| category.id.as_str())
        .collect();

    let mut candidates: Vec<ScoredCandidate<'a>> = catalog
        .iter()
        .filter(|product| !purchased.contains(product.id.as_str()))
        .map(|product| {
            let mut score = 0.0;
            for category in &product.categories {
                if current_ids.contains(category.id.as_str()) {
                    score += CATEGORY_MATCH_BOOST;
                }
                score += FREQUENCY_WEIGHT
                    * *category_frequency.get(category.id.as_str()).unwrap_or(&0) as f64;
            }
            ScoredCandidate { product, score }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product.id.cmp(&b.product.id))
    });

    candidates
}
