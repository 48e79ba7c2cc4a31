// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.create_table("users", |table| {
        table.add_column(
            "id",
            types::custom("UUID PRIMARY KEY DEFAULT gen_random_uuid()"),
        );
        table.add_column("id_serial", types::custom("BIGSERIAL"));
        table.add_column("email", types::varchar(255).unique(true).nullable(false));
        table.add_column("display_name", types::varchar(255).nullable(false));
        table.add_column(
            "tag_prefs",
            types::custom("TEXT[] NOT NULL DEFAULT '{}'::text[]"),
        );
        table.add_column("search_radius", types::custom("DOUBLE PRECISION").nullable(true));
    });

    migr.create_table("groups", |table| {
        table.add_column(
            "id",
            types::custom("UUID PRIMARY KEY DEFAULT gen_random_uuid()"),
        );
        table.add_column("id_serial", types::custom("BIGSERIAL"));
        table.add_column("name", types::text().nullable(false));
    });

    migr.create_table("group_memberships", |table| {
        table.add_column("user_id", types::custom("UUID REFERENCES users(id)"));
        table.add_column("group_id", types::custom("UUID REFERENCES groups(id)"));
        table.add_column("pending", types::boolean().nullable(false).default(true));
        table.inject_custom("PRIMARY KEY (user_id, group_id)");
    });

    migr.create_table("events", |table| {
        table.add_column(
            "id",
            types::custom("UUID PRIMARY KEY DEFAULT gen_random_uuid()"),
        );
        table.add_column("id_serial", types::custom("BIGSERIAL"));
        table.add_column("title", types::text().nullable(false));
        table.add_column("description", types::text().nullable(false));
        table.add_column("created_by", types::custom("UUID NOT NULL REFERENCES users(id)"));
        table.add_column(
            "created_at",
            types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"),
        );
        table.add_column("host_group", types::custom("UUID REFERENCES groups(id)").nullable(true));
        table.add_column("is_public", types::boolean().nullable(false).default(false));
        table.add_column("starts_at", types::custom("TIMESTAMPTZ").nullable(false));
        table.add_column("address", types::text().nullable(false));
        table.add_column("latitude", types::custom("DOUBLE PRECISION").nullable(false));
        table.add_column("longitude", types::custom("DOUBLE PRECISION").nullable(false));
        table.add_column("lat_bucket", types::integer().nullable(false));
        table.add_column("long_bucket", types::integer().nullable(false));
        table.add_column("tags", types::text().nullable(false));
        table.add_column("capacity", types::integer().nullable(false).default(0));
    });

    migr.create_table("enrollments", |table| {
        table.add_column("user_id", types::custom("UUID NOT NULL REFERENCES users(id)"));
        table.add_column(
            "event_id",
            types::custom("UUID NOT NULL REFERENCES events(id)"),
        );
        table.add_column(
            "created_at",
            types::custom("TIMESTAMPTZ NOT NULL DEFAULT now()"),
        );
        table.inject_custom("PRIMARY KEY (user_id, event_id)");
    });

    let mut sql = String::from("CREATE EXTENSION IF NOT EXISTS pgcrypto;");
    sql.push_str(&migr.make::<Pg>());

    // index backing the bucket pre-filter of the public candidate query
    sql.push_str(
        ";CREATE INDEX events_bucket_idx ON events (lat_bucket, long_bucket, starts_at) WHERE is_public;",
    );
    sql.push_str("CREATE INDEX enrollments_event_idx ON enrollments (event_id);");

    sql
}
