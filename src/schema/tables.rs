//! Table declarations for the `public` schema.
//!
//! `themes` is the shared catalog; every other table hangs off a user, an
//! org or an event. Events are the aggregation root: deleting one cascades
//! to venues, schedules, guests (and their rsvps), messages, media,
//! donations, event details and analytics events.

use super::enums::{
    DONATION_METHOD, DONATION_STATUS, EVENT_STATUS, GUEST_STATUS, MEDIA_TYPE, ORG_MEMBER_ROLE,
    RSVP_STATUS,
};
use super::table::{ColumnDefault, ColumnType, OnDelete, Relationship, TableDef, TableKind};
use crate::{id_column, schema_column, timestamp_column};

const EMPTY_JSON: ColumnDefault = ColumnDefault::Literal("'{}'");

const fn event_fk(foreign_key_name: &'static str) -> Relationship {
    Relationship {
        foreign_key_name,
        columns: &["event_id"],
        is_one_to_one: false,
        referenced_relation: "events",
        referenced_columns: &["id"],
        on_delete: OnDelete::Cascade,
    }
}

// =============================================================================
// Catalog
// =============================================================================

pub const THEMES: TableDef = TableDef {
    name: "themes",
    kind: TableKind::Catalog,
    columns: &[
        id_column!(),
        schema_column!("slug", ColumnType::Text, non_null = true, is_unique = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!(
            "is_premium",
            ColumnType::Boolean,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("false"))
        ),
        schema_column!(
            "tokens",
            ColumnType::Json,
            non_null = true,
            default_value = Some(EMPTY_JSON)
        ),
        schema_column!("preview_url", ColumnType::Text),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[&["slug"]],
    relationships: &[],
};

// =============================================================================
// Tenancy
// =============================================================================

/// Users are created by the auth layer, so `id` is supplied, never generated.
pub const USERS: TableDef = TableDef {
    name: "users",
    kind: TableKind::Tenant,
    columns: &[
        schema_column!("id", ColumnType::Uuid, is_primary_key = true, non_null = true),
        schema_column!("email", ColumnType::Text, non_null = true, is_unique = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("avatar_url", ColumnType::Text),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[&["email"]],
    relationships: &[],
};

pub const ORGS: TableDef = TableDef {
    name: "orgs",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("owner_id", ColumnType::Uuid, non_null = true),
        schema_column!(
            "plan",
            ColumnType::Text,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'free'"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[Relationship {
        foreign_key_name: "orgs_owner_id_fkey",
        columns: &["owner_id"],
        is_one_to_one: false,
        referenced_relation: "users",
        referenced_columns: &["id"],
        on_delete: OnDelete::Cascade,
    }],
};

pub const ORG_MEMBERS: TableDef = TableDef {
    name: "org_members",
    kind: TableKind::Tenant,
    columns: &[
        schema_column!("org_id", ColumnType::Uuid, is_primary_key = true, non_null = true),
        schema_column!("user_id", ColumnType::Uuid, is_primary_key = true, non_null = true),
        schema_column!(
            "role",
            ColumnType::Enum(&ORG_MEMBER_ROLE),
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'admin'"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["org_id", "user_id"],
    unique_constraints: &[],
    relationships: &[
        Relationship {
            foreign_key_name: "org_members_org_id_fkey",
            columns: &["org_id"],
            is_one_to_one: false,
            referenced_relation: "orgs",
            referenced_columns: &["id"],
            on_delete: OnDelete::Cascade,
        },
        Relationship {
            foreign_key_name: "org_members_user_id_fkey",
            columns: &["user_id"],
            is_one_to_one: false,
            referenced_relation: "users",
            referenced_columns: &["id"],
            on_delete: OnDelete::Cascade,
        },
    ],
};

// =============================================================================
// Event aggregate
// =============================================================================

pub const EVENTS: TableDef = TableDef {
    name: "events",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("org_id", ColumnType::Uuid),
        schema_column!("user_id", ColumnType::Uuid, non_null = true),
        schema_column!("theme_id", ColumnType::Uuid),
        schema_column!("slug", ColumnType::Text, non_null = true, is_unique = true),
        schema_column!("title", ColumnType::Text, non_null = true),
        schema_column!(
            "status",
            ColumnType::Enum(&EVENT_STATUS),
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'draft'"))
        ),
        schema_column!("publish_at", ColumnType::Timestamptz),
        schema_column!("expire_at", ColumnType::Timestamptz),
        timestamp_column!("created_at"),
        timestamp_column!("updated_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[&["slug"]],
    relationships: &[
        Relationship {
            foreign_key_name: "events_org_id_fkey",
            columns: &["org_id"],
            is_one_to_one: false,
            referenced_relation: "orgs",
            referenced_columns: &["id"],
            on_delete: OnDelete::SetNull,
        },
        Relationship {
            foreign_key_name: "events_theme_id_fkey",
            columns: &["theme_id"],
            is_one_to_one: false,
            referenced_relation: "themes",
            referenced_columns: &["id"],
            on_delete: OnDelete::SetNull,
        },
        Relationship {
            foreign_key_name: "events_user_id_fkey",
            columns: &["user_id"],
            is_one_to_one: false,
            referenced_relation: "users",
            referenced_columns: &["id"],
            on_delete: OnDelete::Cascade,
        },
    ],
};

/// Keyed by its event; at most one row per event.
pub const EVENT_DETAILS: TableDef = TableDef {
    name: "event_details",
    kind: TableKind::Tenant,
    columns: &[
        schema_column!("event_id", ColumnType::Uuid, is_primary_key = true, non_null = true),
        schema_column!(
            "couple",
            ColumnType::Json,
            non_null = true,
            default_value = Some(EMPTY_JSON)
        ),
        schema_column!("story", ColumnType::Text),
        schema_column!("music_url", ColumnType::Text),
        schema_column!(
            "seo_meta",
            ColumnType::Json,
            non_null = true,
            default_value = Some(EMPTY_JSON)
        ),
        timestamp_column!("created_at"),
        timestamp_column!("updated_at"),
    ],
    primary_key: &["event_id"],
    unique_constraints: &[],
    relationships: &[Relationship {
        foreign_key_name: "event_details_event_id_fkey",
        columns: &["event_id"],
        is_one_to_one: true,
        referenced_relation: "events",
        referenced_columns: &["id"],
        on_delete: OnDelete::Cascade,
    }],
};

pub const VENUES: TableDef = TableDef {
    name: "venues",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("address", ColumnType::Text, non_null = true),
        schema_column!("lat", ColumnType::Double),
        schema_column!("lng", ColumnType::Double),
        schema_column!("note", ColumnType::Text),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("venues_event_id_fkey")],
};

pub const SCHEDULES: TableDef = TableDef {
    name: "schedules",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("venue_id", ColumnType::Uuid),
        schema_column!("title", ColumnType::Text, non_null = true),
        schema_column!("datetime", ColumnType::Timestamptz, non_null = true),
        schema_column!(
            "tz",
            ColumnType::Text,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'UTC'"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[
        event_fk("schedules_event_id_fkey"),
        Relationship {
            foreign_key_name: "schedules_venue_id_fkey",
            columns: &["venue_id"],
            is_one_to_one: false,
            referenced_relation: "venues",
            referenced_columns: &["id"],
            on_delete: OnDelete::SetNull,
        },
    ],
};

pub const GUESTS: TableDef = TableDef {
    name: "guests",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("email", ColumnType::Text),
        schema_column!("phone", ColumnType::Text),
        schema_column!("invite_token", ColumnType::Text),
        schema_column!("pin", ColumnType::Text),
        schema_column!("segment", ColumnType::Text),
        schema_column!(
            "status",
            ColumnType::Enum(&GUEST_STATUS),
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'invited'"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("guests_event_id_fkey")],
};

pub const RSVPS: TableDef = TableDef {
    name: "rsvps",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("guest_id", ColumnType::Uuid, non_null = true),
        schema_column!("status", ColumnType::Enum(&RSVP_STATUS), non_null = true),
        schema_column!(
            "pax",
            ColumnType::Integer,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("1"))
        ),
        schema_column!("note", ColumnType::Text),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[Relationship {
        foreign_key_name: "rsvps_guest_id_fkey",
        columns: &["guest_id"],
        is_one_to_one: false,
        referenced_relation: "guests",
        referenced_columns: &["id"],
        on_delete: OnDelete::Cascade,
    }],
};

pub const MESSAGES: TableDef = TableDef {
    name: "messages",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("message", ColumnType::Text, non_null = true),
        schema_column!(
            "approved",
            ColumnType::Boolean,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("false"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("messages_event_id_fkey")],
};

pub const MEDIA: TableDef = TableDef {
    name: "media",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("url", ColumnType::Text, non_null = true),
        schema_column!("type", ColumnType::Enum(&MEDIA_TYPE), non_null = true),
        schema_column!(
            "sort",
            ColumnType::Integer,
            non_null = true,
            default_value = Some(ColumnDefault::Literal("0"))
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("media_event_id_fkey")],
};

pub const DONATIONS: TableDef = TableDef {
    name: "donations",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("name", ColumnType::Text, non_null = true),
        schema_column!("amount", ColumnType::Numeric),
        schema_column!("method", ColumnType::Enum(&DONATION_METHOD), non_null = true),
        schema_column!(
            "status",
            ColumnType::Enum(&DONATION_STATUS),
            non_null = true,
            default_value = Some(ColumnDefault::Literal("'pending'"))
        ),
        schema_column!("proof_url", ColumnType::Text),
        schema_column!("note", ColumnType::Text),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("donations_event_id_fkey")],
};

/// `event_id` points at the invitation event the action was recorded on;
/// the kind of action lives in `type`.
pub const ANALYTICS_EVENTS: TableDef = TableDef {
    name: "analytics_events",
    kind: TableKind::Tenant,
    columns: &[
        id_column!(),
        schema_column!("event_id", ColumnType::Uuid, non_null = true),
        schema_column!("type", ColumnType::Text, non_null = true),
        schema_column!(
            "meta",
            ColumnType::Json,
            non_null = true,
            default_value = Some(EMPTY_JSON)
        ),
        timestamp_column!("created_at"),
    ],
    primary_key: &["id"],
    unique_constraints: &[],
    relationships: &[event_fk("analytics_events_event_id_fkey")],
};

/// Declaration order. Referenced tables come before the tables referencing
/// them, so this is also a valid creation order.
pub const PUBLIC_TABLES: &[TableDef] = &[
    THEMES,
    USERS,
    ORGS,
    ORG_MEMBERS,
    EVENTS,
    EVENT_DETAILS,
    VENUES,
    SCHEDULES,
    GUESTS,
    RSVPS,
    MESSAGES,
    MEDIA,
    DONATIONS,
    ANALYTICS_EVENTS,
];
