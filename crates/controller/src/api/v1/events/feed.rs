// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Event feed assembly
//!
//! The feed is two partitions: events hosted by the user's accepted groups
//! (returned unfiltered) and nearby public events. Public candidates are
//! pre-filtered in the store by bucket neighborhood, then refined here by
//! exact distance against the user's search radius and by tag relevance.
//! The partitions are disjoint by source and are not deduplicated.
use super::EventResource;
use crate::api::v1::{ApiResponse, DefaultApiResult};
use actix_web::get;
use actix_web::web::{Data, Path, Query};
use chrono::Utc;
use database::Db;
use db_storage::events::Event;
use db_storage::geo;
use db_storage::users::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters of the feed endpoint, the user's current location
#[derive(Debug, Deserialize, Validate)]
pub struct FeedQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub long: f64,
}

#[derive(Debug, Serialize)]
pub struct FeedResource {
    /// Upcoming events of the user's accepted groups, unfiltered
    pub group_events: Vec<EventResource>,

    /// Nearby public events after distance and relevance filtering
    pub event_feed: Vec<EventResource>,
}

/// API Endpoint `GET /users/{user_id}/feed?lat=..&long=..`
#[get("/users/{user_id}/feed")]
pub async fn get_feed(
    db: Data<Db>,
    user_id: Path<UserId>,
    query: Query<FeedQuery>,
) -> DefaultApiResult<FeedResource> {
    let user_id = user_id.into_inner();
    let query = query.into_inner();

    query.validate()?;

    let (group_events, event_feed) = crate::block(move || -> database::Result<(Vec<Event>, Vec<Event>)> {
        let mut conn = db.get_conn()?;

        let user = User::get(&mut conn, user_id)?;
        let now = Utc::now();

        let group_events = Event::get_upcoming_for_user_groups(&mut conn, user.id, now)?;

        let lat_buckets = geo::bucket_neighborhood(query.lat);
        let long_buckets = geo::bucket_neighborhood(query.long);

        let candidates =
            Event::get_upcoming_public_in_buckets(&mut conn, &lat_buckets, &long_buckets, now)?;

        let event_feed = refine_candidates(
            candidates,
            query.lat,
            query.long,
            user.search_radius,
            &user.tag_prefs,
        );

        Ok((group_events, event_feed))
    })
    .await??;

    Ok(ApiResponse::new(FeedResource {
        group_events: group_events.into_iter().map(EventResource::from).collect(),
        event_feed: event_feed.into_iter().map(EventResource::from).collect(),
    }))
}

/// Refines the bucket-prefiltered public candidates by exact distance and
/// tag relevance.
///
/// A missing or nonpositive search radius disables the distance check.
fn refine_candidates(
    candidates: Vec<Event>,
    lat: f64,
    long: f64,
    search_radius: Option<f64>,
    tag_prefs: &[String],
) -> Vec<Event> {
    candidates
        .into_iter()
        .filter(|event| match search_radius {
            Some(radius) if radius > 0.0 => {
                geo::distance(lat, long, event.latitude, event.longitude) <= radius
            }
            _ => true,
        })
        .filter(|event| is_relevant(tag_prefs, &event.tags))
        .collect()
}

/// Case-insensitive substring relevance
///
/// An event is relevant if any preference token occurs as a substring of its
/// tag text. An empty preference set matches everything.
fn is_relevant(tag_prefs: &[String], tags: &str) -> bool {
    if tag_prefs.is_empty() {
        return true;
    }

    let tags = tags.to_lowercase();

    tag_prefs
        .iter()
        .any(|pref| tags.contains(&pref.to_lowercase()))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, Utc};
    use db_storage::events::{EventId, SerialEventId};
    use db_storage::users::UserId;

    fn make_event(n: i64, latitude: f64, longitude: f64, tags: &str) -> Event {
        Event {
            id: EventId::from(uuid::Uuid::from_u128(n as u128)),
            id_serial: SerialEventId::from(n),
            title: format!("Event {n}"),
            description: String::new(),
            created_by: UserId::from(uuid::Uuid::nil()),
            created_at: Utc::now(),
            host_group: None,
            is_public: true,
            starts_at: Utc::now() + Duration::days(1),
            address: String::new(),
            latitude,
            longitude,
            lat_bucket: geo::bucket(latitude),
            long_bucket: geo::bucket(longitude),
            tags: tags.into(),
            capacity: 0,
        }
    }

    #[test]
    fn empty_preferences_include_everything() {
        assert!(is_relevant(&[], "music jazz"));
        assert!(is_relevant(&[], ""));
    }

    #[test]
    fn relevance_is_substring_containment() {
        let prefs = vec!["music".to_owned()];

        assert!(is_relevant(&prefs, "live music downtown"));
        assert!(!is_relevant(&prefs, "art gallery opening"));
        // substring match, not token equality
        assert!(is_relevant(&prefs, "musical theatre"));
    }

    #[test]
    fn relevance_ignores_case() {
        let prefs = vec!["Music".to_owned()];

        assert!(is_relevant(&prefs, "MUSIC festival"));
        assert!(is_relevant(&["JAZZ".to_owned()], "jazz night"));
    }

    #[test]
    fn first_matching_preference_wins() {
        let prefs = vec!["art".to_owned(), "music".to_owned()];

        assert!(is_relevant(&prefs, "music only"));
        assert!(is_relevant(&prefs, "art only"));
        assert!(!is_relevant(&prefs, "cooking class"));
    }

    #[test]
    fn music_events_pass_art_events_do_not() {
        let candidates = vec![
            make_event(1, 40.73, -73.99, "music jazz"),
            make_event(2, 40.74, -73.98, "art gallery"),
            make_event(3, 40.72, -74.0, "open mic music"),
        ];

        let prefs = vec!["music".to_owned()];
        let feed = refine_candidates(candidates, 40.73, -73.99, None, &prefs);

        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|event| event.tags.contains("music")));
    }

    #[test]
    fn search_radius_discards_distant_candidates() {
        let candidates = vec![
            // a few blocks away
            make_event(1, 40.74, -73.98, "music"),
            // same bucket neighborhood but ~7 miles out
            make_event(2, 40.83, -73.92, "music"),
        ];

        let feed = refine_candidates(candidates.clone(), 40.73, -73.99, Some(2.0), &[]);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id_serial, SerialEventId::from(1));

        // nonpositive radius means unlimited
        let feed = refine_candidates(candidates.clone(), 40.73, -73.99, Some(0.0), &[]);
        assert_eq!(feed.len(), 2);

        let feed = refine_candidates(candidates, 40.73, -73.99, None, &[]);
        assert_eq!(feed.len(), 2);
    }
}
