//! Aggregation use case - filter, deduplicate and rank fetched records

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::dates;
use crate::model::Article;

/// Drop incomplete records, keep the first occurrence of each URL and order
/// newest first
///
/// Records without a usable title or URL are removed before deduplication so
/// they never shadow a later complete record with the same URL. The sort is
/// stable: records with equal timestamps (including every undated one) keep
/// their input order.
pub fn aggregate(records: Vec<Article>) -> Vec<Article> {
    let total = records.len();
    let mut seen: HashSet<String> = HashSet::new();

    let mut kept: Vec<Article> = records
        .into_iter()
        .filter(|article| article.url().is_some() && article.title().is_some())
        .filter(|article| match article.url() {
            Some(url) => seen.insert(url.to_string()),
            None => false,
        })
        .collect();

    kept.sort_by_key(|article| Reverse(dates::rank_key(article.published_at.as_deref())));

    tracing::debug!(input = total, output = kept.len(), "Aggregated articles");

    kept
}
