use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{double_option, impl_patch, Entity};
use crate::schema::tables::{EVENTS, EVENT_DETAILS, SCHEDULES, VENUES};
use crate::schema::{EventStatus, TableDef};

// =============================================================================
// Event
// =============================================================================

/// An invitation event, root of the guest/venue/schedule/media aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub org_id: Option<Uuid>,
    pub user_id: Uuid,
    pub theme_id: Option<Uuid>,
    /// Globally unique, used in public invitation URLs.
    pub slug: String,
    pub title: String,
    pub status: EventStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Published and inside its publication window, if it has one.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published
            && self.publish_at.map_or(true, |at| at <= now)
            && self.expire_at.map_or(true, |at| now < at)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<Uuid>,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub org_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub theme_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub publish_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub expire_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_patch!(EventUpdate => Event {
    id,
    org_id,
    user_id,
    theme_id,
    slug,
    title,
    status,
    publish_at,
    expire_at,
    created_at,
    updated_at,
});

impl Entity for Event {
    type Insert = NewEvent;
    type Update = EventUpdate;
    const TABLE: &'static TableDef = &EVENTS;
}

// =============================================================================
// EventDetails
// =============================================================================

/// Presentation content of an event. One row per event, keyed by `event_id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event_id: Uuid,
    /// Names, parents and photos of the couple.
    pub couple: serde_json::Value,
    pub story: Option<String>,
    pub music_url: Option<String>,
    pub seo_meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEventDetails {
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couple: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetailsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couple: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub story: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub music_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_patch!(EventDetailsUpdate => EventDetails {
    event_id,
    couple,
    story,
    music_url,
    seo_meta,
    created_at,
    updated_at,
});

impl Entity for EventDetails {
    type Insert = NewEventDetails;
    type Update = EventDetailsUpdate;
    const TABLE: &'static TableDef = &EVENT_DETAILS;
}

// =============================================================================
// Venue
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewVenue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub lat: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub lng: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_patch!(VenueUpdate => Venue { id, event_id, name, address, lat, lng, note, created_at });

impl Entity for Venue {
    type Insert = NewVenue;
    type Update = VenueUpdate;
    const TABLE: &'static TableDef = &VENUES;
}

// =============================================================================
// Schedule
// =============================================================================

/// A timed part of the event (ceremony, reception, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Must be a venue of the same event.
    pub venue_id: Option<Uuid>,
    pub title: String,
    pub datetime: DateTime<Utc>,
    /// IANA zone name used for display.
    pub tz: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<Uuid>,
    pub title: String,
    pub datetime: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub venue_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_patch!(ScheduleUpdate => Schedule { id, event_id, venue_id, title, datetime, tz, created_at });

impl Entity for Schedule {
    type Insert = NewSchedule;
    type Update = ScheduleUpdate;
    const TABLE: &'static TableDef = &SCHEDULES;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::models::Patch;
    use chrono::Duration;

    fn make_event(status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            org_id: None,
            user_id: Uuid::new_v4(),
            theme_id: None,
            slug: "dina-and-raka".to_string(),
            title: "Dina & Raka".to_string(),
            status,
            publish_at: None,
            expire_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_draft_events_are_never_live() {
        assert!(!make_event(EventStatus::Draft).is_live_at(Utc::now()));
        assert!(make_event(EventStatus::Published).is_live_at(Utc::now()));
    }

    #[test]
    fn test_publication_window_bounds_liveness() {
        let now = Utc::now();
        let mut event = make_event(EventStatus::Published);
        event.publish_at = Some(now + Duration::days(1));
        assert!(!event.is_live_at(now));

        event.publish_at = Some(now - Duration::days(1));
        event.expire_at = Some(now);
        assert!(!event.is_live_at(now));
        assert!(event.is_live_at(now - Duration::hours(1)));
    }

    #[test]
    fn test_event_update_can_clear_org() {
        let mut event = make_event(EventStatus::Draft);
        event.org_id = Some(Uuid::new_v4());
        let update = EventUpdate {
            org_id: Some(None),
            status: Some(EventStatus::Published),
            ..Default::default()
        };
        update.apply(&mut event);
        assert_eq!(event.org_id, None);
        assert_eq!(event.status, EventStatus::Published);
    }
}
