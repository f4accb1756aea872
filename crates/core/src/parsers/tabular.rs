use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use super::{Cell, Row};
use crate::model::{Card, Direction, NodeKind, Timeline};

const DATE_ALIASES: &[&str] = &["datum", "date"];
const TIME_ALIASES: &[&str] = &["tijd", "time"];
const STATUS_ALIASES: &[&str] = &["statustext", "status", "type"];
const VEHICLE_ALIASES: &[&str] = &["voertuig", "vehicle", "kenteken", "nummerplaat"];
const PLACE_ALIASES: &[&str] = &["plaats", "location", "locatie", "plaatsnaam"];

const SECONDS_PER_DAY: f64 = 86_400.0;
const LAST_SECOND_OF_DAY: u32 = 86_399;

/// A sheet row reduced to what a card needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub at: NaiveDateTime,
    pub direction: Direction,
    pub kind: NodeKind,
    pub place: String,
}

impl ImportRecord {
    pub fn to_card(&self) -> Card {
        Card {
            kind: self.kind,
            direction: self.direction,
            title: self.at.format("%H:%M:%S").to_string(),
            description: self.place.clone(),
        }
    }
}

/// `None` when the row lacks a parseable date or time.
pub fn normalize_row(row: &Row) -> Option<ImportRecord> {
    let date = row.pick(DATE_ALIASES).and_then(parse_date)?;
    let time = row.pick(TIME_ALIASES).and_then(parse_time)?;
    let status = row.pick(STATUS_ALIASES).map(Cell::text).unwrap_or_default();
    let vehicle = row.pick(VEHICLE_ALIASES).map(Cell::text).unwrap_or_default();
    let place = row.pick(PLACE_ALIASES).map(Cell::text).unwrap_or_default();

    Some(ImportRecord {
        at: date.and_time(time),
        direction: Direction::from_status(&status),
        kind: kind_for_vehicle(&vehicle),
        place,
    })
}

/// One timeline per calendar day, titled `YYYY-MM-DD`, cards in time order.
pub fn rows_to_timelines(rows: &[Row]) -> Vec<Timeline> {
    let mut records: Vec<ImportRecord> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let record = normalize_row(row);
            if record.is_none() {
                tracing::debug!(row = i + 1, "dropping row without date or time");
            }
            record
        })
        .collect();
    // stable: same-instant rows keep sheet order
    records.sort_by_key(|r| r.at);

    records
        .chunk_by(|a, b| a.at.date() == b.at.date())
        .map(|day| {
            let title = day[0].at.format("%Y-%m-%d").to_string();
            Timeline::with_cards(title, day.iter().map(ImportRecord::to_card).collect())
        })
        .collect()
}

/// Empty or exactly `prikklok` means a clock terminal; any other vehicle is a vehicle.
fn kind_for_vehicle(vehicle: &str) -> NodeKind {
    let v = vehicle.trim().to_lowercase();
    if v.is_empty() || v == "prikklok" {
        NodeKind::Prikklok
    } else {
        NodeKind::Voertuig
    }
}

fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(serial) => date_from_serial(*serial),
        Cell::Text(s) => parse_date_text(s.trim()),
        Cell::Empty => None,
    }
}

/// Spreadsheet serial: whole days since 1899-12-30.
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if !starts_with_year(s) {
        return parse_day_first(s);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

fn starts_with_year(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10 && b[..4].iter().all(u8::is_ascii_digit) && b[4] == b'-'
}

/// `d/m/yy`, `dd-mm-yyyy` and mixes thereof; two-digit years are 20xx.
fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-']).collect();
    let &[d, m, y] = parts.as_slice() else {
        return None;
    };
    let digits = |p: &str, min: usize, max: usize| {
        (min..=max).contains(&p.len()) && p.chars().all(|c| c.is_ascii_digit())
    };
    if !(digits(d, 1, 2) && digits(m, 1, 2) && digits(y, 2, 4)) {
        return None;
    }
    let mut year: i32 = y.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
}

fn parse_time(cell: &Cell) -> Option<NaiveTime> {
    match cell {
        Cell::Number(fraction) if fraction.is_finite() => {
            let secs = (fraction * SECONDS_PER_DAY).round().clamp(0.0, LAST_SECOND_OF_DAY as f64);
            NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)
        }
        Cell::Text(s) => parse_time_text(s.trim()),
        _ => None,
    }
}

/// `H:MM` or `HH:MM:SS`, range checked.
fn parse_time_text(s: &str) -> Option<NaiveTime> {
    let parts: Vec<&str> = s.split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] if sec.len() == 2 => (*h, *m, *sec),
        _ => return None,
    };
    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if !(all_digits(h) && h.len() <= 2 && all_digits(m) && m.len() == 2 && all_digits(sec)) {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, Cell)]) -> Row {
        cells.iter().cloned().collect()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn serial_dates_count_from_1899_12_30() {
        assert_eq!(date_from_serial(45352.0), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(date_from_serial(45352.75), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(date_from_serial(-1.0), None);
    }

    #[test]
    fn date_strings() {
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date_text("2024-03-01"), march_first);
        assert_eq!(parse_date_text("2024-03-01T08:30:00"), march_first);
        assert_eq!(parse_date_text("01/03/2024"), march_first);
        assert_eq!(parse_date_text("1-3-24"), march_first);
        assert_eq!(parse_date_text("31/02/2024"), None);
        assert_eq!(parse_date_text("gisteren"), None);
    }

    #[test]
    fn time_fractions_round_and_clamp() {
        assert_eq!(parse_time(&Cell::Number(0.5)), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time(&Cell::Number(1.0)), NaiveTime::from_hms_opt(23, 59, 59));
        assert_eq!(parse_time(&Cell::Number(-0.2)), NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn time_strings() {
        assert_eq!(parse_time_text("8:05"), NaiveTime::from_hms_opt(8, 5, 0));
        assert_eq!(parse_time_text("23:59:30"), NaiveTime::from_hms_opt(23, 59, 30));
        assert_eq!(parse_time_text("24:00"), None);
        assert_eq!(parse_time_text("12:5"), None);
        assert_eq!(parse_time_text("12:00:7"), None);
    }

    #[test]
    fn record_fields() {
        let r = normalize_row(&row(&[
            ("Datum", text("2024-03-01")),
            ("Tijd", text("07:45")),
            ("StatusText", text("stop")),
            ("Kenteken", text("1-ABC-123")),
            ("Plaats", text(" Gent ")),
        ]))
        .unwrap();
        let card = r.to_card();
        assert_eq!(card.title, "07:45:00");
        assert_eq!(card.direction, Direction::Out);
        assert_eq!(card.kind, NodeKind::Voertuig);
        assert_eq!(card.description, "Gent");
    }

    #[test]
    fn prikklok_or_missing_vehicle_is_a_clock() {
        assert_eq!(kind_for_vehicle("Prikklok"), NodeKind::Prikklok);
        assert_eq!(kind_for_vehicle(""), NodeKind::Prikklok);
        assert_eq!(kind_for_vehicle("bestelwagen"), NodeKind::Voertuig);
    }

    #[test]
    fn midnight_is_a_valid_time() {
        let r = normalize_row(&row(&[("date", text("2024-03-01")), ("time", Cell::Number(0.0))]));
        assert_eq!(r.unwrap().to_card().title, "00:00:00");
    }

    #[test]
    fn groups_by_day_in_time_order() {
        let rows = vec![
            row(&[("datum", text("02/03/2024")), ("tijd", text("09:00")), ("status", text("START"))]),
            row(&[("datum", text("2024-03-01")), ("tijd", text("17:00")), ("status", text("STOP"))]),
            row(&[("datum", text("2024-03-01")), ("tijd", text("08:00")), ("status", text("START"))]),
            row(&[("datum", Cell::Empty), ("tijd", text("10:00"))]),
        ];
        let timelines = rows_to_timelines(&rows);
        assert_eq!(timelines.len(), 2);
        assert_eq!(timelines[0].title, "2024-03-01");
        let titles: Vec<_> = timelines[0].cards().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["08:00:00", "17:00:00"]);
        assert_eq!(timelines[0].cards()[1].direction, Direction::Out);
        assert_eq!(timelines[1].title, "2024-03-02");
        assert_eq!(timelines[1].len(), 1);
    }
}
