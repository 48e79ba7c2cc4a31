// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

table! {
    enrollments (user_id, event_id) {
        user_id -> Uuid,
        event_id -> Uuid,
        created_at -> Timestamptz,
    }
}

table! {
    events (id) {
        id -> Uuid,
        id_serial -> Int8,
        title -> Text,
        description -> Text,
        created_by -> Uuid,
        created_at -> Timestamptz,
        host_group -> Nullable<Uuid>,
        is_public -> Bool,
        starts_at -> Timestamptz,
        address -> Text,
        latitude -> Float8,
        longitude -> Float8,
        lat_bucket -> Int4,
        long_bucket -> Int4,
        tags -> Text,
        capacity -> Int4,
    }
}

table! {
    group_memberships (user_id, group_id) {
        user_id -> Uuid,
        group_id -> Uuid,
        pending -> Bool,
    }
}

table! {
    groups (id) {
        id -> Uuid,
        id_serial -> Int8,
        name -> Text,
    }
}

table! {
    refinery_schema_history (version) {
        version -> Int4,
        name -> Nullable<Varchar>,
        applied_on -> Nullable<Varchar>,
        checksum -> Nullable<Varchar>,
    }
}

table! {
    users (id) {
        id -> Uuid,
        id_serial -> Int8,
        email -> Varchar,
        display_name -> Varchar,
        tag_prefs -> Array<Text>,
        search_radius -> Nullable<Float8>,
    }
}

joinable!(enrollments -> events (event_id));
joinable!(enrollments -> users (user_id));
joinable!(events -> users (created_by));
joinable!(group_memberships -> groups (group_id));
joinable!(group_memberships -> users (user_id));

allow_tables_to_appear_in_same_query!(
    enrollments,
    events,
    group_memberships,
    groups,
    refinery_schema_history,
    users,
);
