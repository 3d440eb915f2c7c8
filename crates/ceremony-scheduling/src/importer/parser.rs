use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::io::Read;

use crate::scheduling::{RegistrationStatus, VenueCategory};

/// One normalized row of a legacy registry export.
#[derive(Debug, Clone)]
pub(crate) struct LegacyRecord {
    pub(crate) registration_id: String,
    pub(crate) date: NaiveDate,
    pub(crate) slot: NaiveTime,
    pub(crate) category: VenueCategory,
    pub(crate) status: RegistrationStatus,
}

/// Why a row could not be normalized. Reported, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RowIssue {
    MissingRegistrationId,
    BadDate(String),
    BadTime(String),
    UnknownVenue(String),
    UnknownStatus(String),
}

impl RowIssue {
    pub(crate) fn describe(&self) -> String {
        match self {
            RowIssue::MissingRegistrationId => "registration id is empty".to_string(),
            RowIssue::BadDate(raw) => format!("'{raw}' is not a YYYY-MM-DD date"),
            RowIssue::BadTime(raw) => format!("'{raw}' is not an HH:MM time"),
            RowIssue::UnknownVenue(raw) => format!("'{raw}' is not a known venue"),
            RowIssue::UnknownStatus(raw) => format!("'{raw}' is not a known status"),
        }
    }
}

pub(crate) fn parse_records<R: Read>(
    reader: R,
) -> Result<Vec<(u64, Result<LegacyRecord, RowIssue>)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    // Header occupies line 1; data rows start at 2.
    for (index, row) in csv_reader.deserialize::<LegacyRow>().enumerate() {
        let line = index as u64 + 2;
        records.push((line, row?.normalize()));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LegacyRow {
    #[serde(rename = "Registration ID")]
    registration_id: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Venue")]
    venue: String,
    #[serde(rename = "Status")]
    status: String,
}

impl LegacyRow {
    fn normalize(self) -> Result<LegacyRecord, RowIssue> {
        if self.registration_id.is_empty() {
            return Err(RowIssue::MissingRegistrationId);
        }

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| RowIssue::BadDate(self.date.clone()))?;
        let slot = parse_time(&self.time).ok_or_else(|| RowIssue::BadTime(self.time.clone()))?;
        let category =
            parse_venue(&self.venue).ok_or_else(|| RowIssue::UnknownVenue(self.venue.clone()))?;
        let status =
            parse_status(&self.status).ok_or_else(|| RowIssue::UnknownStatus(self.status.clone()))?;

        Ok(LegacyRecord {
            registration_id: self.registration_id,
            date,
            slot,
            category,
            status,
        })
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// The legacy registry was free-text here; accept the spellings found in
/// real exports.
fn parse_venue(raw: &str) -> Option<VenueCategory> {
    match raw.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
        "on_premise" | "office" | "hall" => Some(VenueCategory::OnPremise),
        "off_premise" | "external" | "outside" => Some(VenueCategory::OffPremise),
        _ => None,
    }
}

fn parse_status(raw: &str) -> Option<RegistrationStatus> {
    let normalized = raw.to_ascii_lowercase().replace([' ', '-'], "_");
    RegistrationStatus::ordered()
        .into_iter()
        .find(|status| status.label() == normalized)
}
