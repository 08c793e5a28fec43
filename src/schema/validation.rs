//! Boundary validation for values headed to the store.
//!
//! The store is the last line of integrity enforcement; these checks catch
//! the mistakes the model can see on its own (closed domains, required
//! text, non-negative counts, illegal status changes) before a write is
//! attempted.

use thiserror::Error;

use super::enums::StatusTransition;
use super::models::{
    DonationUpdate, EventUpdate, GuestUpdate, NewDonation, NewEvent, NewGuest, NewMedia,
    NewMessage, NewOrg, NewRsvp, NewSchedule, NewTheme, NewUser, NewVenue, RsvpUpdate,
};
use super::{DatabaseSchema, DonationStatus, EventStatus, GuestStatus};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required but was empty")]
    EmptyField { field: &'static str },

    #[error("Field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("Field '{field}' must be a finite number, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("Value '{value}' is not a member of domain '{domain}'")]
    NotInDomain { domain: &'static str, value: String },

    #[error("Unknown enum domain '{0}'")]
    UnknownDomain(String),

    #[error("Illegal {domain} transition from '{from}' to '{to}'")]
    IllegalTransition {
        domain: &'static str,
        from: &'static str,
        to: &'static str,
    },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check a raw string against a named domain of `schema`.
pub fn parse_enum_value<'a>(
    schema: &DatabaseSchema,
    domain: &str,
    value: &'a str,
) -> ValidationResult<&'a str> {
    let domain = schema
        .enum_domain(domain)
        .ok_or_else(|| ValidationError::UnknownDomain(domain.to_string()))?;
    if domain.contains(value) {
        Ok(value)
    } else {
        Err(ValidationError::NotInDomain {
            domain: domain.name,
            value: value.to_string(),
        })
    }
}

/// Same-state writes pass; anything else must be a declared transition.
pub fn validate_status_change<S: StatusTransition>(current: S, next: S) -> ValidationResult<()> {
    if current == next || current.allows(&next) {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition {
            domain: S::DOMAIN.name,
            from: current.as_db_str(),
            to: next.as_db_str(),
        })
    }
}

fn require_text(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    require_text("email", &user.email)?;
    require_text("name", &user.name)
}

pub fn validate_new_org(org: &NewOrg) -> ValidationResult<()> {
    require_text("name", &org.name)
}

pub fn validate_new_theme(theme: &NewTheme) -> ValidationResult<()> {
    require_text("slug", &theme.slug)?;
    require_text("name", &theme.name)
}

pub fn validate_new_event(event: &NewEvent) -> ValidationResult<()> {
    require_text("slug", &event.slug)?;
    require_text("title", &event.title)
}

pub fn validate_event_update(current: EventStatus, update: &EventUpdate) -> ValidationResult<()> {
    if let Some(slug) = &update.slug {
        require_text("slug", slug)?;
    }
    if let Some(title) = &update.title {
        require_text("title", title)?;
    }
    if let Some(next) = update.status {
        validate_status_change(current, next)?;
    }
    Ok(())
}

pub fn validate_new_venue(venue: &NewVenue) -> ValidationResult<()> {
    require_text("name", &venue.name)?;
    require_text("address", &venue.address)
}

pub fn validate_new_schedule(schedule: &NewSchedule) -> ValidationResult<()> {
    require_text("title", &schedule.title)?;
    if let Some(tz) = &schedule.tz {
        require_text("tz", tz)?;
    }
    Ok(())
}

pub fn validate_new_guest(guest: &NewGuest) -> ValidationResult<()> {
    require_text("name", &guest.name)
}

pub fn validate_guest_update(current: GuestStatus, update: &GuestUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        require_text("name", name)?;
    }
    if let Some(next) = update.status {
        validate_status_change(current, next)?;
    }
    Ok(())
}

pub fn validate_new_rsvp(rsvp: &NewRsvp) -> ValidationResult<()> {
    if let Some(pax) = rsvp.pax {
        require_non_negative("pax", f64::from(pax))?;
    }
    Ok(())
}

pub fn validate_rsvp_update(update: &RsvpUpdate) -> ValidationResult<()> {
    if let Some(pax) = update.pax {
        require_non_negative("pax", f64::from(pax))?;
    }
    Ok(())
}

pub fn validate_new_message(message: &NewMessage) -> ValidationResult<()> {
    require_text("name", &message.name)?;
    require_text("message", &message.message)
}

pub fn validate_new_media(media: &NewMedia) -> ValidationResult<()> {
    require_text("url", &media.url)
}

pub fn validate_new_donation(donation: &NewDonation) -> ValidationResult<()> {
    require_text("name", &donation.name)?;
    if let Some(amount) = donation.amount {
        require_non_negative("amount", amount)?;
    }
    // Inserts may carry any status reachable from pending.
    if let Some(status) = donation.status {
        validate_status_change(DonationStatus::Pending, status)?;
    }
    Ok(())
}

pub fn validate_donation_update(
    current: DonationStatus,
    update: &DonationUpdate,
) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        require_text("name", name)?;
    }
    if let Some(next) = update.status {
        validate_status_change(current, next)?;
    }
    Ok(())
}
