use crate::infra::{parse_date, parse_venue, InMemoryBookingRepository, LoggingNotificationDispatcher};
use ceremony_scheduling::error::AppError;
use ceremony_scheduling::importer::LegacyRegistryImporter;
use ceremony_scheduling::scheduling::{
    ActorRole, BookingRequest, RegistrationId, RegistrationStatus, SchedulingError,
    SlotAllocationService, VenueCategory,
};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = SlotAllocationService<InMemoryBookingRepository, LoggingNotificationDispatcher>;

#[derive(Args, Debug)]
pub(crate) struct CalendarArgs {
    /// Calendar year
    #[arg(long)]
    pub(crate) year: i32,
    /// Calendar month (1-12)
    #[arg(long)]
    pub(crate) month: u32,
    /// Venue category to render (on-premise | off-premise)
    #[arg(long, value_parser = parse_venue, default_value = "off-premise")]
    pub(crate) venue: VenueCategory,
    /// Optional legacy registry CSV export to load before rendering
    #[arg(long)]
    pub(crate) registry_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Ceremony date used by the demo bookings (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Optional legacy registry CSV export to load first
    #[arg(long)]
    pub(crate) registry_csv: Option<PathBuf>,
}

fn build_service() -> (DemoService, Arc<LoggingNotificationDispatcher>) {
    let dispatcher = Arc::new(LoggingNotificationDispatcher::default());
    let service = SlotAllocationService::new(
        Arc::new(InMemoryBookingRepository::default()),
        dispatcher.clone(),
    );
    (service, dispatcher)
}

fn load_registry(
    service: &DemoService,
    registry_csv: Option<&PathBuf>,
) -> Result<(), AppError> {
    let Some(path) = registry_csv else {
        return Ok(());
    };

    let report = LegacyRegistryImporter::from_path(path, service.ledger())?;
    println!(
        "Imported {} legacy bookings ({} rows skipped)",
        report.imported,
        report.skipped.len()
    );
    for row in &report.skipped {
        println!("  line {}: {}", row.line, row.reason);
    }
    println!();
    Ok(())
}

pub(crate) fn run_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let CalendarArgs {
        year,
        month,
        venue,
        registry_csv,
    } = args;

    let (service, _) = build_service();
    load_registry(&service, registry_csv.as_ref())?;

    let days = service.month_calendar(year, month, venue)?;

    println!("{venue} availability for {year}-{month:02}");
    for day in days {
        println!("  {}  {}", day.date, day.availability);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { date, registry_csv } = args;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let (service, dispatcher) = build_service();
    load_registry(&service, registry_csv.as_ref())?;

    println!("== Booking intake for {date} ==");
    let nine = NaiveTime::from_hms_opt(9, 0, 0).expect("valid time");

    let hall = book(&service, "REG-1001", date, nine, VenueCategory::OnPremise)?;
    book(&service, "REG-1002", date, nine, VenueCategory::OffPremise)?;
    book(&service, "REG-1003", date, nine, VenueCategory::OffPremise)?;

    // The slot now sits at the combined cap; a fourth couple is turned away.
    match service.request_booking(BookingRequest {
        registration_id: RegistrationId("REG-1004".to_string()),
        date,
        slot: nine,
        category: VenueCategory::OffPremise,
        actor_role: ActorRole::Registrant,
    }) {
        Err(SchedulingError::Ledger(error)) => {
            println!("REG-1004 rejected: {error}");
        }
        Ok(_) => println!("REG-1004 unexpectedly admitted"),
        Err(error) => return Err(error.into()),
    }

    println!();
    println!("== Staff and supervisor workflow ==");
    for (target, role) in [
        (RegistrationStatus::Approved, ActorRole::Staff),
        (RegistrationStatus::AwaitingAssignment, ActorRole::Staff),
        (RegistrationStatus::OfficiantAssigned, ActorRole::Supervisor),
        (RegistrationStatus::Completed, ActorRole::Staff),
    ] {
        service.advance_status(&hall.id, target, role)?;
        println!("{} -> {} (by {})", hall.registration_id, target, role);
    }

    println!();
    println!("== Slots on {date} ==");
    let schedule = service.daily_slots(date)?;
    for slot in schedule.slots {
        println!(
            "  {}  hall {}/{}  external {}/{}",
            slot.slot,
            slot.on_premise,
            slot.on_premise + slot.on_premise_remaining,
            slot.off_premise,
            slot.off_premise + slot.off_premise_remaining,
        );
    }

    println!();
    println!("== Month view ({}-{:02}) ==", date.year(), date.month());
    let days = service.month_calendar(date.year(), date.month(), VenueCategory::OffPremise)?;
    for day in days.iter().filter(|day| day.date == date) {
        println!("  {}  {}", day.date, day.availability);
    }

    println!();
    println!(
        "{} notification events queued for the dispatcher",
        dispatcher.events().len()
    );

    service.audit_day(date)?;
    println!("ledger audit passed");

    Ok(())
}

fn book(
    service: &DemoService,
    registration: &str,
    date: NaiveDate,
    slot: NaiveTime,
    category: VenueCategory,
) -> Result<ceremony_scheduling::Booking, AppError> {
    let booking = service.request_booking(BookingRequest {
        registration_id: RegistrationId(registration.to_string()),
        date,
        slot,
        category,
        actor_role: ActorRole::Registrant,
    })?;
    println!(
        "{} admitted at {} ({}) as {}",
        booking.registration_id, booking.slot, booking.category, booking.id
    );
    Ok(booking)
}
