use chrono::NaiveDate;
use deadline_service::models::{ClientRecord, FinancialYear, FirmCalendar};
use deadline_service::services::generate_deadlines;
use std::collections::HashSet;

fn client(assigned_ca_id: Option<&str>) -> ClientRecord {
    ClientRecord {
        client_id: "client-42".to_string(),
        firm_id: "firm-7".to_string(),
        assigned_ca_id: assigned_ca_id.map(str::to_string),
        onboarded_on: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    }
}

#[test]
fn default_calendar_yields_thirty_seven_deadlines() {
    let deadlines = generate_deadlines(
        &client(Some("ca-1")),
        &FirmCalendar::default_entries(),
        FinancialYear::new(2024),
    );

    assert_eq!(deadlines.len(), 37);
    for obligation in ["GSTR-1", "GSTR-3B", "TDS"] {
        let count = deadlines
            .iter()
            .filter(|d| d.obligation_type == obligation)
            .count();
        assert_eq!(count, 12, "{}", obligation);
    }
}

#[test]
fn december_tds_falls_due_in_january() {
    let deadlines = generate_deadlines(
        &client(Some("ca-1")),
        &FirmCalendar::default_entries(),
        FinancialYear::new(2024),
    );

    let december_tds = deadlines
        .iter()
        .find(|d| d.obligation_type == "TDS" && d.period_month == 12 && d.period_year == 2024)
        .expect("December TDS deadline");
    assert_eq!(
        december_tds.due_date,
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    );
}

#[test]
fn income_tax_return_appears_once_in_july() {
    let deadlines = generate_deadlines(
        &client(Some("ca-1")),
        &FirmCalendar::default_entries(),
        FinancialYear::new(2024),
    );

    let itr: Vec<_> = deadlines
        .iter()
        .filter(|d| d.obligation_type == "ITR Filing")
        .collect();
    assert_eq!(itr.len(), 1);
    assert_eq!(itr[0].due_date, NaiveDate::from_ymd_opt(2024, 7, 31).unwrap());
}

#[test]
fn unassigned_client_gets_unassigned_deadlines() {
    let deadlines = generate_deadlines(
        &client(None),
        &FirmCalendar::default_entries(),
        FinancialYear::new(2024),
    );

    assert!(!deadlines.is_empty());
    assert!(deadlines.iter().all(|d| d.assigned_ca_id.is_none()));
    assert!(deadlines.iter().all(|d| d.firm_id == "firm-7"));
}

#[test]
fn natural_keys_are_unique() {
    let deadlines = generate_deadlines(
        &client(Some("ca-1")),
        &FirmCalendar::default_entries(),
        FinancialYear::new(2024),
    );

    let keys: HashSet<_> = deadlines.iter().map(|d| d.key()).collect();
    assert_eq!(keys.len(), deadlines.len());
}

#[test]
fn regenerating_is_deterministic_apart_from_ids() {
    let calendar = FirmCalendar::default_entries();
    let first = generate_deadlines(&client(Some("ca-1")), &calendar, FinancialYear::new(2024));
    let second = generate_deadlines(&client(Some("ca-1")), &calendar, FinancialYear::new(2024));

    let project = |d: &deadline_service::models::Deadline| (d.key(), d.due_date);
    let a: Vec<_> = first.iter().map(project).collect();
    let b: Vec<_> = second.iter().map(project).collect();
    assert_eq!(a, b);
}

#[test]
fn any_onboarding_date_in_the_year_yields_a_full_calendar() {
    let cases = [
        ((2024, 4, 1), 2024),
        ((2024, 12, 31), 2024),
        ((2025, 1, 15), 2024),
        ((2025, 3, 31), 2024),
        ((2025, 4, 1), 2025),
    ];

    for ((y, m, d), start_year) in cases {
        let mut record = client(Some("ca-1"));
        record.onboarded_on = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let fy = FinancialYear::containing(record.onboarded_on);
        assert_eq!(fy.start_year, start_year, "onboarded {}", record.onboarded_on);

        let deadlines = generate_deadlines(&record, &FirmCalendar::default_entries(), fy);
        assert_eq!(deadlines.len(), 37, "onboarded {}", record.onboarded_on);

        let itr: Vec<_> = deadlines
            .iter()
            .filter(|d| d.obligation_type == "ITR Filing")
            .collect();
        assert_eq!(itr.len(), 1);
        assert_eq!(
            itr[0].due_date,
            NaiveDate::from_ymd_opt(start_year, 7, 31).unwrap(),
            "onboarded {}",
            record.onboarded_on
        );
    }
}
