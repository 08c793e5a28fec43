use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{double_option, impl_patch, Entity};
use crate::schema::tables::{DONATIONS, MEDIA, MESSAGES};
use crate::schema::{DonationMethod, DonationStatus, MediaType, TableDef};

// =============================================================================
// Message
// =============================================================================

/// A guestbook entry. Hidden from the public page until approved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Author's display name.
    pub name: String,
    pub message: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_publicly_visible(&self) -> bool {
        self.approved
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_patch!(MessageUpdate => Message { id, event_id, name, message, approved, created_at });

impl Entity for Message {
    type Insert = NewMessage;
    type Update = MessageUpdate;
    const TABLE: &'static TableDef = &MESSAGES;
}

// =============================================================================
// Media
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub event_id: Uuid,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    /// Display position; ties are allowed.
    pub sort: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_patch!(MediaUpdate => Media { id, event_id, url, kind, sort, created_at });

impl Entity for Media {
    type Insert = NewMedia;
    type Update = MediaUpdate;
    const TABLE: &'static TableDef = &MEDIA;
}

/// Orders media for display. Stable, so equal `sort` values keep their
/// relative order.
pub fn sort_for_display(media: &mut [Media]) {
    media.sort_by_key(|m| m.sort);
}

// =============================================================================
// Donation
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Donor's display name.
    pub name: String,
    pub amount: Option<f64>,
    pub method: DonationMethod,
    pub status: DonationStatus,
    pub proof_url: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewDonation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub event_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub method: DonationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DonationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub amount: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<DonationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DonationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub proof_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_patch!(DonationUpdate => Donation {
    id,
    event_id,
    name,
    amount,
    method,
    status,
    proof_url,
    note,
    created_at,
});

impl Entity for Donation {
    type Insert = NewDonation;
    type Update = DonationUpdate;
    const TABLE: &'static TableDef = &DONATIONS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_column_is_named_type() {
        let media: Media = serde_json::from_value(json!({
            "id": "7d6a0a59-1d44-4b8e-9b1e-7f0f3c1f4a10",
            "event_id": "0d1e6a0e-7c0e-4c68-a7e2-1b5d0b0e7a11",
            "url": "https://cdn.example.com/a.mp4",
            "type": "video",
            "sort": 2,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(media.kind, MediaType::Video);
        assert_eq!(serde_json::to_value(&media).unwrap()["type"], "video");
    }

    #[test]
    fn test_display_order_is_by_sort_and_stable() {
        let make = |url: &str, sort: i32| Media {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            url: url.to_string(),
            kind: MediaType::Image,
            sort,
            created_at: Utc::now(),
        };
        let mut media = vec![make("c", 2), make("a", 1), make("b", 1)];
        sort_for_display(&mut media);
        let urls: Vec<&str> = media.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_donation_method_is_rejected_at_the_boundary() {
        let result = serde_json::from_value::<NewDonation>(json!({
            "event_id": "0d1e6a0e-7c0e-4c68-a7e2-1b5d0b0e7a11",
            "name": "Ayu",
            "method": "cash"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_messages_start_hidden() {
        let message = Message {
            id: Uuid::new_v4(),
            event_id: Uuid::nil(),
            name: "Tante Rina".to_string(),
            message: "Selamat!".to_string(),
            approved: false,
            created_at: Utc::now(),
        };
        assert!(!message.is_publicly_visible());
    }
}
