use chrono::NaiveDate;
use gtfs_structures::{Gtfs, Trip};

pub fn does_trip_run(gtfs: &Gtfs, trip: &Trip, date: NaiveDate) -> bool {
    let in_calendar = gtfs.calendar.get(trip.service_id.as_str()).is_some_and(|calendar| {
        calendar.valid_weekday(date) && calendar.start_date <= date && date <= calendar.end_date
    });
    let calendar_dates = gtfs.calendar_dates.get(trip.service_id.as_str());

    if !gtfs.calendar.contains_key(trip.service_id.as_str()) && calendar_dates.is_none() {
        log::warn!("Trip {} does not have a valid service_id.", trip.id);
        return false;
    }

    // Exceptions in calendar_dates override the regular calendar.
    match calendar_dates.and_then(|dates| dates.iter().find(|calendar_date| calendar_date.date == date)) {
        Some(calendar_date) => matches!(calendar_date.exception_type, gtfs_structures::Exception::Added),
        None => in_calendar,
    }
}
