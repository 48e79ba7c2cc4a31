// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

use gather_db_storage::enrollments::{AdmissionOutcome, Enrollment, NewEnrollment};
use gather_db_storage::events::Event;
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn admission_is_capacity_bounded() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 2)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    for n in 2..=3 {
        let user = db_ctx.create_test_user(n, vec![]).unwrap();
        let outcome = NewEnrollment {
            user_id: user.id,
            event_id: event.id,
        }
        .try_admit(&mut conn)
        .unwrap();

        assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));
    }

    let user = db_ctx.create_test_user(4, vec![]).unwrap();
    let outcome = NewEnrollment {
        user_id: user.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();

    assert_eq!(outcome, AdmissionOutcome::CapacityExceeded);
    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 2);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn concurrent_admissions_never_overbook() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 1)
        .unwrap();

    let users = (2..=5)
        .map(|n| db_ctx.create_test_user(n, vec![]).unwrap())
        .collect::<Vec<_>>();

    // every thread races its own connection against the others
    let handles = users
        .into_iter()
        .map(|user| {
            let db = db_ctx.db.clone();
            let event_id = event.id;

            std::thread::spawn(move || {
                let mut conn = db.get_conn().unwrap();

                NewEnrollment {
                    user_id: user.id,
                    event_id,
                }
                .try_admit(&mut conn)
                .unwrap()
            })
        })
        .collect::<Vec<_>>();

    let admitted = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|outcome| matches!(outcome, AdmissionOutcome::Admitted(_)))
        .count();

    assert_eq!(admitted, 1);

    let mut conn = db_ctx.db.get_conn().unwrap();
    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn duplicate_signup_is_rejected_without_error() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let user = db_ctx.create_test_user(2, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 10)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    let first = NewEnrollment {
        user_id: user.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert!(matches!(first, AdmissionOutcome::Admitted(_)));

    let second = NewEnrollment {
        user_id: user.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert_eq!(second, AdmissionOutcome::AlreadyEnrolled);

    // the duplicate attempt does not consume a seat
    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn withdraw_frees_the_seat() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let alice = db_ctx.create_test_user(2, vec![]).unwrap();
    let bob = db_ctx.create_test_user(3, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 1)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    let outcome = NewEnrollment {
        user_id: alice.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));

    let outcome = NewEnrollment {
        user_id: bob.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert_eq!(outcome, AdmissionOutcome::CapacityExceeded);

    assert!(Enrollment::delete_by_id(&mut conn, alice.id, event.id).unwrap());
    // withdrawing twice is a no-op
    assert!(!Enrollment::delete_by_id(&mut conn, alice.id, event.id).unwrap());

    // the withdrawn user can take the freed seat again
    let outcome = NewEnrollment {
        user_id: alice.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));

    let outcome = NewEnrollment {
        user_id: alice.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert_eq!(outcome, AdmissionOutcome::AlreadyEnrolled);

    let outcome = NewEnrollment {
        user_id: bob.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();
    assert_eq!(outcome, AdmissionOutcome::CapacityExceeded);

    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn nonpositive_capacity_admits_unconditionally() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 0)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    for n in 2..=20 {
        let user = db_ctx.create_test_user(n, vec![]).unwrap();
        let outcome = NewEnrollment {
            user_id: user.id,
            event_id: event.id,
        }
        .try_admit(&mut conn)
        .unwrap();

        assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));
    }

    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 19);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn deleting_an_event_removes_its_enrollments() {
    let db_ctx = test_util::database::DatabaseContext::new(true).await;

    let host = db_ctx.create_test_user(1, vec![]).unwrap();
    let user = db_ctx.create_test_user(2, vec![]).unwrap();
    let event = db_ctx
        .create_test_event(host.id, None, true, 40.7, -74.0, "music", 0)
        .unwrap();

    let mut conn = db_ctx.db.get_conn().unwrap();

    NewEnrollment {
        user_id: user.id,
        event_id: event.id,
    }
    .try_admit(&mut conn)
    .unwrap();

    assert!(Event::delete_by_id(&mut conn, event.id).unwrap());
    assert_eq!(Enrollment::count_for_event(&mut conn, event.id).unwrap(), 0);
    assert!(!Event::delete_by_id(&mut conn, event.id).unwrap());
}
