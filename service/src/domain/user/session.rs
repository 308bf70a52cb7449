//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// User session claims.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`user::Role`] of the [`User`] at the time the [`Session`] was
    /// created.
    #[serde(with = "role_claim")]
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Returns the [`user::Actor`] these claims describe.
    #[must_use]
    pub fn actor(&self) -> user::Actor {
        user::Actor {
            id: self.user_id,
            role: self.role,
        }
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

mod role_claim {
    //! Serialization of a [`user::Role`] claim by its name.

    use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

    use crate::domain::user;

    /// Serializes the [`user::Role`] as its name.
    ///
    /// # Errors
    ///
    /// Never.
    pub(super) fn serialize<S: Serializer>(
        role: &user::Role,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&role.to_string())
    }

    /// Deserializes a [`user::Role`] from its name.
    ///
    /// # Errors
    ///
    /// If the name is not a known [`user::Role`].
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<user::Role, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::Session;

    #[test]
    fn claims_round_trip_as_json() {
        let session = Session {
            user_id: user::Id::new(),
            role: user::Role::LandOfficer,
            expires_at: common::DateTimeOf::now(),
        };

        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"LAND_OFFICER\""));
        assert!(json.contains("\"exp\""));

        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.user_id, session.user_id);
        assert_eq!(parsed.role, session.role);
    }
}
