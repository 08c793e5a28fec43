//! Closed enumerated domains.
//!
//! Every status/type/role/method column in the schema draws its values from
//! one of the domains below. Each domain exists twice: as a Rust enum for
//! typed code, and as an [`EnumDomain`] record so tooling can enumerate the
//! legal values by name without knowing the Rust type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validation::ValidationError;

/// Introspectable description of a closed domain.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDomain {
    /// Name of the domain as declared in the store (e.g. `rsvp_status`).
    pub name: &'static str,
    /// Every legal value, in declaration order.
    pub values: &'static [&'static str],
}

impl EnumDomain {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }
}

/// Implemented by every enum generated with `db_enum!`.
pub trait DbEnum: Sized + Copy + 'static {
    const DOMAIN: &'static EnumDomain;
    const VARIANTS: &'static [Self];

    fn as_db_str(&self) -> &'static str;

    fn from_db_str(value: &str) -> Result<Self, ValidationError> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.as_db_str() == value)
            .ok_or_else(|| ValidationError::NotInDomain {
                domain: Self::DOMAIN.name,
                value: value.to_string(),
            })
    }
}

macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $domain_const:ident = $domain:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        pub const $domain_const: EnumDomain = EnumDomain {
            name: $domain,
            values: &[$($value),+],
        };

        impl DbEnum for $name {
            const DOMAIN: &'static EnumDomain = &$domain_const;
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn as_db_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_db_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as DbEnum>::from_db_str(s)
            }
        }
    };
}

db_enum! {
    /// Payment channel a donation was made through.
    DonationMethod, DONATION_METHOD = "donation_method" {
        Qris => "qris",
        Transfer => "transfer",
    }
}

db_enum! {
    /// Review state of a donation.
    DonationStatus, DONATION_STATUS = "donation_status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Rejected => "rejected",
    }
}

db_enum! {
    /// Publication state of an event.
    EventStatus, EVENT_STATUS = "event_status" {
        Draft => "draft",
        Published => "published",
    }
}

db_enum! {
    /// Delivery lifecycle of a guest's invitation. Variant order is lifecycle order.
    GuestStatus, GUEST_STATUS = "guest_status" {
        Invited => "invited",
        Sent => "sent",
        Opened => "opened",
        Rsvped => "rsvped",
    }
}

db_enum! {
    MediaType, MEDIA_TYPE = "media_type" {
        Image => "image",
        Video => "video",
    }
}

db_enum! {
    OrgMemberRole, ORG_MEMBER_ROLE = "org_member_role" {
        Owner => "owner",
        Admin => "admin",
    }
}

db_enum! {
    /// A guest's answer to the invitation.
    RsvpStatus, RSVP_STATUS = "rsvp_status" {
        Yes => "yes",
        No => "no",
        Maybe => "maybe",
    }
}

/// All domains declared in the public schema, sorted by name.
pub const ALL_DOMAINS: &[&EnumDomain] = &[
    &DONATION_METHOD,
    &DONATION_STATUS,
    &EVENT_STATUS,
    &GUEST_STATUS,
    &MEDIA_TYPE,
    &ORG_MEMBER_ROLE,
    &RSVP_STATUS,
];

// =============================================================================
// State machines
// =============================================================================

/// Legal status transitions for a stateful enum.
///
/// Writing the current value again is never a transition and is always allowed.
pub trait StatusTransition: DbEnum + PartialEq {
    fn allows(&self, next: &Self) -> bool;

    fn is_terminal(&self) -> bool {
        !Self::VARIANTS.iter().any(|v| v != self && self.allows(v))
    }
}

impl StatusTransition for EventStatus {
    fn allows(&self, next: &Self) -> bool {
        matches!((self, next), (EventStatus::Draft, EventStatus::Published))
    }
}

impl StatusTransition for GuestStatus {
    fn allows(&self, next: &Self) -> bool {
        next > self
    }
}

impl StatusTransition for DonationStatus {
    fn allows(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (DonationStatus::Pending, DonationStatus::Confirmed)
                | (DonationStatus::Pending, DonationStatus::Rejected)
        )
    }
}
