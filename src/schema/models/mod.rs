//! Typed Row / Insert / Update shapes for every entity.
//!
//! - The row struct (`Guest`) is the full persisted record.
//! - The insert struct (`NewGuest`) carries every required column; columns
//!   the store can fill (ids, timestamps, defaulted statuses) are optional
//!   and skipped when unset so the store default applies.
//! - The update struct (`GuestUpdate`) makes every column optional. Nullable
//!   columns are `Option<Option<T>>`: `None` leaves the column alone,
//!   `Some(None)` clears it, `Some(Some(v))` sets it.

mod analytics;
mod content;
mod event;
mod guest;
mod tenancy;
mod theme;

pub use analytics::{AnalyticsEvent, AnalyticsEventUpdate, NewAnalyticsEvent};
pub use content::{
    Donation, DonationUpdate, Media, MediaUpdate, Message, MessageUpdate, NewDonation, NewMedia,
    NewMessage,
};
pub use event::{
    Event, EventDetails, EventDetailsUpdate, EventUpdate, NewEvent, NewEventDetails, NewSchedule,
    NewVenue, Schedule, ScheduleUpdate, Venue, VenueUpdate,
};
pub use guest::{Guest, GuestUpdate, NewGuest, NewRsvp, Rsvp, RsvpUpdate};
pub use tenancy::{NewOrg, NewOrgMember, NewUser, Org, OrgMember, OrgMemberUpdate, OrgUpdate, User, UserUpdate};
pub use theme::{NewTheme, Theme, ThemeUpdate};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::TableDef;

/// Binds a row type to its table and its insert/update shapes.
pub trait Entity: Serialize + DeserializeOwned {
    type Insert: Serialize + DeserializeOwned;
    type Update: Patch<Self> + Serialize + DeserializeOwned + Default;

    const TABLE: &'static TableDef;
}

/// Partial update semantics: only the fields present are written.
pub trait Patch<T> {
    fn apply(self, row: &mut T);

    /// True when applying would change nothing.
    fn is_empty(&self) -> bool;
}

macro_rules! impl_patch {
    ($update:ty => $row:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::schema::models::Patch<$row> for $update {
            fn apply(self, row: &mut $row) {
                $(
                    if let Some(value) = self.$field {
                        row.$field = value;
                    }
                )+
            }

            fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }
        }
    };
}
pub(crate) use impl_patch;

/// Serde adapter keeping "absent" and "null" apart on `Option<Option<T>>`.
///
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
