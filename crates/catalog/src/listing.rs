//! Ordering rules shared by every listing view.

use chrono::{DateTime, Utc};

use crate::product::Product;

/// Sort most recent first by normalized creation time, ties by id.
///
/// `now` stands in for missing timestamps; pass one value per listing so every
/// record in the same view is normalized against the same instant.
pub fn sort_newest_first<T: AsRef<Product>>(items: &mut [T], now: DateTime<Utc>) {
    items.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        b.created_at
            .normalize(now)
            .cmp(&a.created_at.normalize(now))
            .then_with(|| a.id.cmp(&b.id))
    });
}
