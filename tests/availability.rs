#![forbid(unsafe_code)]
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dispo::{
    engine::{DayClass, PlanError, Planner},
    model::{
        CountryCode, Holiday, IntervalKind, OrgUnit, PhaseId, PhaseRef, PhaseStatus, ProjectId,
        User, UserId, WorkingDaysConfig,
    },
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn delivery(status: PhaseStatus) -> IntervalKind {
    IntervalKind::Delivery {
        phase: PhaseRef {
            id: PhaseId::new("acme-ph1"),
            status,
        },
        role: None,
    }
}

fn holiday(y: i32, m: u32, d: u32, country: Option<&str>) -> Holiday {
    Holiday {
        date: date(y, m, d),
        country: country.map(CountryCode::new),
        name: "férié".into(),
    }
}

fn setup() -> (Planner, UserId) {
    let mut planner = Planner::new();
    let unit = OrgUnit::new("paris");
    let unit_id = unit.id.clone();
    planner.workspace_mut().units.push(unit);
    let mut alice = User::new("alice", "Alice");
    alice.units.push(unit_id);
    alice.country = Some(CountryCode::new("fr"));
    let alice_id = alice.id.clone();
    planner.add_users(vec![alice]);
    (planner, alice_id)
}

// Semaine de référence : lundi 2025-03-03 .. dimanche 2025-03-09.

#[test]
fn working_days_exclude_weekend_and_holiday() {
    let (mut p, alice) = setup();
    p.workspace_mut()
        .holidays
        .push(holiday(2025, 3, 5, Some("FR")));
    // férié d'un autre pays : sans effet ici
    p.workspace_mut()
        .holidays
        .push(holiday(2025, 3, 6, Some("DE")));

    let a = p
        .availability(&alice, date(2025, 3, 3), date(2025, 3, 9), None)
        .unwrap();
    assert_eq!(
        a.working_days,
        vec![
            date(2025, 3, 3),
            date(2025, 3, 4),
            date(2025, 3, 6),
            date(2025, 3, 7)
        ]
    );
    assert_eq!(a.days[&date(2025, 3, 5)], DayClass::Holiday);
    assert_eq!(a.days[&date(2025, 3, 8)], DayClass::NonWorkingWeekday);
    assert_eq!(a.days[&date(2025, 3, 9)], DayClass::NonWorkingWeekday);
}

#[test]
fn global_holiday_applies_to_every_country() {
    let (mut p, alice) = setup();
    p.workspace_mut().holidays.push(holiday(2025, 3, 6, None));

    let a = p
        .availability(&alice, date(2025, 3, 3), date(2025, 3, 7), None)
        .unwrap();
    assert_eq!(a.working_days.len(), 4);
    assert_eq!(a.days[&date(2025, 3, 6)], DayClass::Holiday);
}

#[test]
fn confirmed_wins_over_non_delivery() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 9, 0),
        utc(2025, 3, 4, 17, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();
    p.book(
        &alice,
        utc(2025, 3, 4, 8, 0),
        utc(2025, 3, 4, 18, 0),
        IntervalKind::InternalProject {
            project: ProjectId::new("formation"),
        },
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 4), date(2025, 3, 4), None)
        .unwrap();
    // partition : le jour est confirmé, pas non-delivery
    assert_eq!(a.days[&date(2025, 3, 4)], DayClass::Confirmed);
    assert_eq!(a.counts.confirmed, 1);
    assert_eq!(a.counts.non_delivery, 0);
    // compteurs bruts : les deux catégories comptent
    assert_eq!(a.raw.confirmed, 1);
    assert_eq!(a.raw.non_delivery, 1);
}

#[test]
fn below_threshold_is_tentative() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 9, 0),
        utc(2025, 3, 4, 17, 0),
        delivery(PhaseStatus::SCHEDULED_TENTATIVE),
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 4), date(2025, 3, 4), None)
        .unwrap();
    assert_eq!(a.days[&date(2025, 3, 4)], DayClass::Tentative);
    // planifié = tentative + confirmé
    assert_eq!(a.counts.scheduled(), 1);
    assert_eq!(a.pct.tentative, 100.0);
    assert_eq!(a.pct.confirmed, 0.0);
}

#[test]
fn leave_counts_as_non_delivery() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 6, 0, 0),
        utc(2025, 3, 7, 0, 0),
        IntervalKind::Leave,
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 6), date(2025, 3, 6), None)
        .unwrap();
    assert_eq!(a.days[&date(2025, 3, 6)], DayClass::NonDelivery);
}

#[test]
fn comment_does_not_consume_availability() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 8, 0),
        utc(2025, 3, 4, 18, 0),
        IntervalKind::Comment {
            note: "à confirmer".into(),
        },
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 4), date(2025, 3, 4), None)
        .unwrap();
    assert_eq!(a.days[&date(2025, 3, 4)], DayClass::Available);
}

#[test]
fn day_is_probed_at_noon() {
    let (mut p, alice) = setup();
    // après-midi seulement : midi n'est pas couvert
    p.book(
        &alice,
        utc(2025, 3, 4, 13, 0),
        utc(2025, 3, 4, 15, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();
    // matinée débordant sur midi : couvert
    p.book(
        &alice,
        utc(2025, 3, 5, 8, 0),
        utc(2025, 3, 5, 12, 30),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 4), date(2025, 3, 5), None)
        .unwrap();
    assert_eq!(a.days[&date(2025, 3, 4)], DayClass::Available);
    assert_eq!(a.days[&date(2025, 3, 5)], DayClass::Confirmed);
}

#[test]
fn zero_working_days_yields_zero_percentages() {
    let (p, alice) = setup();
    let a = p
        .availability(&alice, date(2025, 3, 8), date(2025, 3, 9), None)
        .unwrap();
    assert!(a.working_days.is_empty());
    assert_eq!(a.pct.available, 0.0);
    assert_eq!(a.pct.confirmed, 0.0);
    assert_eq!(a.pct.tentative, 0.0);
    assert_eq!(a.pct.non_delivery, 0.0);
}

#[test]
fn percentages_round_to_one_decimal() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 9, 0),
        utc(2025, 3, 3, 17, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    // lundi-mercredi : 3 jours ouvrés, 1 confirmé
    let a = p
        .availability(&alice, date(2025, 3, 3), date(2025, 3, 5), None)
        .unwrap();
    assert_eq!(a.pct.confirmed, 33.3);
    assert_eq!(a.pct.available, 66.7);
}

#[test]
fn partition_covers_every_date_exactly_once() {
    let (mut p, alice) = setup();
    p.workspace_mut()
        .holidays
        .push(holiday(2025, 3, 5, Some("FR")));
    p.book(
        &alice,
        utc(2025, 3, 3, 9, 0),
        utc(2025, 3, 4, 17, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    let a = p
        .availability(&alice, date(2025, 3, 3), date(2025, 3, 9), None)
        .unwrap();
    // une classe par date, toutes les dates présentes
    assert_eq!(a.days.len(), 7);
    // la somme des compteurs partitionnés vaut le nombre de jours ouvrés
    let partitioned = a.counts.available + a.counts.non_delivery + a.counts.tentative
        + a.counts.confirmed;
    assert_eq!(partitioned as usize, a.working_days.len());
    // bornes des pourcentages
    for pct in [a.pct.available, a.pct.non_delivery, a.pct.tentative, a.pct.confirmed] {
        assert!((0.0..=100.0).contains(&pct));
    }
}

#[test]
fn explicit_unit_overrides_membership() {
    let (mut p, alice) = setup();
    let mut mondays_only = OrgUnit::new("permanence-lundi");
    mondays_only.working_days = WorkingDaysConfig::new([1]);
    let unit_id = mondays_only.id.clone();
    p.workspace_mut().units.push(mondays_only);

    let a = p
        .availability(&alice, date(2025, 3, 3), date(2025, 3, 9), Some(&unit_id))
        .unwrap();
    assert_eq!(a.working_days, vec![date(2025, 3, 3)]);
}

#[test]
fn missing_membership_falls_back_to_site_defaults() {
    let mut p = Planner::new();
    let bob = User::new("bob", "Bob");
    let bob_id = bob.id.clone();
    p.add_users(vec![bob]);

    let a = p
        .availability(&bob_id, date(2025, 3, 3), date(2025, 3, 9), None)
        .unwrap();
    // défaut site : lundi-vendredi
    assert_eq!(a.working_days.len(), 5);
}

#[test]
fn invalid_inputs_are_rejected() {
    let (p, alice) = setup();
    let err = p
        .availability(&alice, date(2025, 3, 9), date(2025, 3, 3), None)
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRange));

    let err = p
        .availability(&UserId::new("ghost"), date(2025, 3, 3), date(2025, 3, 9), None)
        .unwrap_err();
    assert!(matches!(err, PlanError::UnknownUser(_)));
}
