//! Signed-in user profile.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_record, Scalar};
use crate::error::ParseError;
use crate::session::CachedIdentity;
use crate::text::non_blank;

/// Profile from `GET /api/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUser {
    id: Option<Scalar>,
    name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    mobile: Option<String>,
}

impl TryFrom<RawUser> for CurrentUser {
    type Error = ParseError;

    fn try_from(value: RawUser) -> Result<Self, ParseError> {
        let id = value
            .id
            .as_ref()
            .and_then(Scalar::as_id_string)
            .ok_or(ParseError::MissingField {
                record: "user",
                field: "id",
            })?;
        let name = non_blank(value.name)
            .or_else(|| non_blank(value.username))
            .ok_or(ParseError::MissingField {
                record: "user",
                field: "name",
            })?;
        Ok(Self {
            id,
            name,
            email: non_blank(value.email),
            mobile: non_blank(value.mobile),
        })
    }
}

impl CurrentUser {
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        deserialize_record::<RawUser>("user", value)?.try_into()
    }

    pub fn identity(&self) -> CachedIdentity {
        CachedIdentity {
            user_id: self.id.clone(),
            user_name: self.name.clone(),
        }
    }
}
