use crate::PoseDriverError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new identifier
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from a UUID string
            #[inline]
            pub fn from_string(id: impl AsRef<str>) -> Result<Self, PoseDriverError> {
                Self::try_from(id.as_ref())
            }

            /// Get the underlying UUID
            #[inline]
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = PoseDriverError;

            #[inline]
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| PoseDriverError::InvalidValue {
                        reason: format!(concat!("Invalid ", $label, " ID: {}"), s),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a pose group, assigned when the group is created
    GroupId,
    "group"
);

entity_id!(
    /// Unique identifier for a driven shape key, assigned when the binding is created
    ShapeKeyId,
    "shape key"
);

impl ShapeKeyId {
    /// Host data key under which the raw distance array of this shape key is published.
    pub fn data_key(&self) -> String {
        format!("pds_{}", self.0.simple())
    }
}
