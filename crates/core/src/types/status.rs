//! Closed value sets stored as text columns.
//!
//! Every enum here round-trips through its snake_case name: that is the
//! JSON representation, the database representation and the `FromStr`
//! input. Repositories bind `as_str()` and parse rows back with `FromStr`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not one of an enum's allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct InvalidVariant {
    /// Name of the value set (e.g. `status`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All allowed values, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical snake_case name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(InvalidVariant {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Whether a store or staff member is currently operating.
    #[derive(Default)]
    ActivityStatus, "status" {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

string_enum! {
    /// What a store target measures.
    MetricType, "metric_type" {
        CustomerVisits => "customer_visits",
        Orders => "orders",
        Revenue => "revenue",
    }
}

string_enum! {
    /// The cadence a store target applies to.
    PeriodType, "period_type" {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

string_enum! {
    /// Lifecycle of a store target.
    #[derive(Default)]
    TargetStatus, "status" {
        #[default]
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// Role derived for an authenticated user.
    ///
    /// Never stored: it is resolved at login by probing the manager table,
    /// then the representative table. A user in neither has no role.
    StaffRole, "role" {
        StoreManager => "store_manager",
        StoreRepresentative => "store_representative",
    }
}
