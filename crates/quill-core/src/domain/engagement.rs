//! Per-post engagement state: likes and time-windowed views.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::EngagementIdentity;

/// Likes and views of a single post.
///
/// The like count is always the size of the liker set, and the view count
/// never decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    liked_by: BTreeSet<String>,
    views: u64,
    viewed_by: BTreeMap<String, DateTime<Utc>>,
}

impl Engagement {
    /// Rebuild engagement state from persisted fields.
    pub fn restore(
        liked_by: impl IntoIterator<Item = String>,
        views: u64,
        viewed_by: BTreeMap<String, DateTime<Utc>>,
    ) -> Self {
        Self {
            liked_by: liked_by.into_iter().collect(),
            views,
            viewed_by,
        }
    }

    pub fn likes(&self) -> u64 {
        self.liked_by.len() as u64
    }

    pub fn liked_by(&self) -> &BTreeSet<String> {
        &self.liked_by
    }

    pub fn views(&self) -> u64 {
        self.views
    }

    pub fn viewed_by(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.viewed_by
    }

    pub fn has_liked(&self, identity: &EngagementIdentity) -> bool {
        self.liked_by.contains(&identity.key())
    }

    /// Add a like. Returns `false` if the identity had already liked.
    pub fn like(&mut self, identity: &EngagementIdentity) -> bool {
        self.liked_by.insert(identity.key())
    }

    /// Remove a like. Returns `false` if there was nothing to remove.
    pub fn unlike(&mut self, identity: &EngagementIdentity) -> bool {
        self.liked_by.remove(&identity.key())
    }

    /// Count a view unless the same identity viewed within `window` before `now`.
    ///
    /// Returns whether the view was counted. A counted view also forgets
    /// viewers whose last view is older than `window`.
    pub fn record_view(
        &mut self,
        identity: &EngagementIdentity,
        now: DateTime<Utc>,
        window: Duration,
    ) -> bool {
        let key = identity.key();
        if let Some(last) = self.viewed_by.get(&key) {
            if now.signed_duration_since(*last) < window {
                return false;
            }
        }

        self.views = self.views.saturating_add(1);
        self.viewed_by.retain(|_, last| now.signed_duration_since(*last) < window);
        self.viewed_by.insert(key, now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> EngagementIdentity {
        EngagementIdentity::User(id.to_string())
    }

    #[test]
    fn test_like_is_idempotent() {
        let mut e = Engagement::default();
        assert!(e.like(&user("u1")));
        assert!(!e.like(&user("u1")));
        assert_eq!(e.likes(), 1);
        assert!(e.has_liked(&user("u1")));
    }

    #[test]
    fn test_unlike_without_like_is_noop() {
        let mut e = Engagement::default();
        assert!(!e.unlike(&user("u1")));
        assert_eq!(e.likes(), 0);

        e.like(&user("u1"));
        e.like(&user("u2"));
        assert!(e.unlike(&user("u1")));
        assert_eq!(e.likes(), 1);
        assert_eq!(e.likes() as usize, e.liked_by().len());
    }

    #[test]
    fn test_view_window_suppresses_repeats() {
        let mut e = Engagement::default();
        let t0 = Utc::now();
        let window = Duration::hours(6);
        let id = user("viewer");

        assert!(e.record_view(&id, t0, window));
        assert!(!e.record_view(&id, t0 + Duration::hours(1), window));
        assert_eq!(e.views(), 1);

        assert!(e.record_view(&id, t0 + Duration::hours(7), window));
        assert_eq!(e.views(), 2);
        assert_eq!(e.viewed_by().get(&id.key()), Some(&(t0 + Duration::hours(7))));
    }

    #[test]
    fn test_view_exactly_at_window_boundary_counts() {
        let mut e = Engagement::default();
        let t0 = Utc::now();
        let window = Duration::hours(6);
        e.record_view(&user("v"), t0, window);
        assert!(e.record_view(&user("v"), t0 + window, window));
    }

    #[test]
    fn test_counted_view_drops_expired_viewers() {
        let mut e = Engagement::default();
        let t0 = Utc::now();
        let window = Duration::hours(6);

        e.record_view(&user("old"), t0, window);
        e.record_view(&user("recent"), t0 + Duration::hours(4), window);
        assert!(e.record_view(&user("new"), t0 + Duration::hours(8), window));

        assert_eq!(e.views(), 3);
        assert!(!e.viewed_by().contains_key(&user("old").key()));
        assert!(e.viewed_by().contains_key(&user("recent").key()));
        assert!(e.viewed_by().contains_key(&user("new").key()));

        // A suppressed view leaves the map alone.
        assert!(!e.record_view(&user("recent"), t0 + Duration::hours(9), window));
        assert_eq!(e.viewed_by().len(), 2);
    }

    #[test]
    fn test_restore_dedups_likers() {
        let e = Engagement::restore(
            vec!["user:a".to_string(), "user:a".to_string(), "user:b".to_string()],
            10,
            BTreeMap::new(),
        );
        assert_eq!(e.likes(), 2);
        assert_eq!(e.views(), 10);
    }
}
