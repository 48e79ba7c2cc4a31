// SPDX-FileCopyrightText: Gather contributors
//
// SPDX-License-Identifier: EUPL-1.2

use serde::{Deserialize, Deserializer};

/// Deserializes a field wrapped in a double Option
///
/// Allows a PATCH body to distinguish between an absent field (`None`) and a
/// field explicitly set to null (`Some(None)`).
pub(super) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
