// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

use chrono::{Duration, Utc};
use gather_db_storage::events::{Event, UpdateEvent};
use gather_db_storage::geo;
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn bucket_prefilter_returns_nearby_public_events_only() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();

    // Manhattan, a few blocks apart - same bucket neighborhood
    let nearby = db_ctx
        .create_test_event(host.id, None, true, 40.73, -73.99, "music", 0)
        .unwrap();
    let next_bucket = db_ctx
        .create_test_event(host.id, None, true, 40.65, -74.05, "music", 0)
        .unwrap();

    // Los Angeles, far outside any neighborhood of the query point
    let far_away = db_ctx
        .create_test_event(host.id, None, true, 34.05, -118.24, "music", 0)
        .unwrap();

    // nearby but private, must not show up in the public candidate set
    let private = db_ctx
        .create_test_event(host.id, None, false, 40.73, -73.99, "music", 0)
        .unwrap();

    let lat_buckets = geo::bucket_neighborhood(40.73);
    let long_buckets = geo::bucket_neighborhood(-73.99);

    let mut conn = db_ctx.db.get_conn().unwrap();
    let candidates =
        Event::get_upcoming_public_in_buckets(&mut conn, &lat_buckets, &long_buckets, Utc::now())
            .unwrap();

    let ids = candidates.iter().map(|event| event.id).collect::<Vec<_>>();

    assert!(ids.contains(&nearby.id));
    assert!(ids.contains(&next_bucket.id));
    assert!(!ids.contains(&far_away.id));
    assert!(!ids.contains(&private.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn past_events_are_not_candidates() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();

    let yesterday = Utc::now() - Duration::days(1);
    let past = db_ctx
        .create_test_event_at(host.id, None, true, 40.73, -73.99, "music", 0, yesterday)
        .unwrap();
    let upcoming = db_ctx
        .create_test_event(host.id, None, true, 40.73, -73.99, "music", 0)
        .unwrap();

    let lat_buckets = geo::bucket_neighborhood(40.73);
    let long_buckets = geo::bucket_neighborhood(-73.99);

    let mut conn = db_ctx.db.get_conn().unwrap();
    let candidates =
        Event::get_upcoming_public_in_buckets(&mut conn, &lat_buckets, &long_buckets, Utc::now())
            .unwrap();

    let ids = candidates.iter().map(|event| event.id).collect::<Vec<_>>();

    assert!(!ids.contains(&past.id));
    assert!(ids.contains(&upcoming.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn group_events_require_an_accepted_membership() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let member = db_ctx.create_test_user(2, vec![]).unwrap();
    let invitee = db_ctx.create_test_user(3, vec![]).unwrap();
    let outsider = db_ctx.create_test_user(4, vec![]).unwrap();

    let group = db_ctx.create_test_group("Hiking Club").unwrap();
    db_ctx
        .create_test_membership(member.id, group.id, false)
        .unwrap();
    db_ctx
        .create_test_membership(invitee.id, group.id, true)
        .unwrap();

    let event = db_ctx
        .create_test_event(host.id, Some(group.id), false, 40.73, -73.99, "hiking", 0)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    let visible = Event::get_upcoming_for_user_groups(&mut conn, member.id, Utc::now()).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, event.id);

    // a pending invitation grants no visibility
    let visible = Event::get_upcoming_for_user_groups(&mut conn, invitee.id, Utc::now()).unwrap();
    assert!(visible.is_empty());

    let visible = Event::get_upcoming_for_user_groups(&mut conn, outsider.id, Utc::now()).unwrap();
    assert!(visible.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn coordinate_updates_recompute_the_buckets() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.73, -73.99, "music", 0)
        .unwrap();

    assert_eq!(event.lat_bucket, geo::bucket(40.73));
    assert_eq!(event.long_bucket, geo::bucket(-73.99));

    let mut conn = db_ctx.db.get_conn().unwrap();

    let updated = UpdateEvent::default()
        .with_latitude(34.05)
        .with_longitude(-118.24)
        .apply(&mut conn, event.id)
        .unwrap();

    assert_eq!(updated.latitude, 34.05);
    assert_eq!(updated.lat_bucket, geo::bucket(34.05));
    assert_eq!(updated.long_bucket, geo::bucket(-118.24));

    // non-coordinate updates leave the buckets untouched
    let mut rename = UpdateEvent::default();
    rename.title = Some("Renamed".into());
    let updated = rename.apply(&mut conn, event.id).unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.lat_bucket, geo::bucket(34.05));
}
