// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

//! Group and group membership structs and queries
//!
//! Memberships are written by the surrounding application (invitations are a
//! collaborator workflow); the feed engine only reads them. A membership with
//! `pending = true` is an outstanding invitation and does not make the group's
//! events visible.

use super::schema::{group_memberships, groups};
use super::users::{User, UserId};
use database::{DbConnection, Result};
use diesel::{
    Associations, ExpressionMethods, Identifiable, Insertable, QueryDsl, Queryable, RunQueryDsl,
};

diesel_newtype! {
    #[derive(Copy)] GroupId(uuid::Uuid) => diesel::sql_types::Uuid,
    #[derive(Copy)] SerialGroupId(i64) => diesel::sql_types::BigInt
}

impl GroupId {
    pub fn generate() -> Self {
        Self::from(uuid::Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Queryable, Identifiable)]
#[diesel(table_name = groups)]
pub struct Group {
    pub id: GroupId,
    pub id_serial: SerialGroupId,
    pub name: String,
}

impl Group {
    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, group_id: GroupId) -> Result<Group> {
        let group = groups::table.filter(groups::id.eq(group_id)).first(conn)?;

        Ok(group)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    pub name: String,
}

impl NewGroup {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<Group> {
        let group = self.insert_into(groups::table).get_result(conn)?;

        Ok(group)
    }
}

#[derive(Debug, Queryable, Identifiable, Associations)]
#[diesel(table_name = group_memberships)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(belongs_to(Group, foreign_key = group_id))]
#[diesel(primary_key(user_id, group_id))]
pub struct GroupMembership {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub pending: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = group_memberships)]
pub struct NewGroupMembership {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub pending: bool,
}

impl NewGroupMembership {
    #[tracing::instrument(err, skip_all)]
    pub fn insert(self, conn: &mut DbConnection) -> Result<GroupMembership> {
        let membership = self.insert_into(group_memberships::table).get_result(conn)?;

        Ok(membership)
    }
}
