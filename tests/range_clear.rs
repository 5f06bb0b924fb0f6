#![forbid(unsafe_code)]
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dispo::{
    engine::{ClearOptions, PlanError, Planner},
    model::{
        IntervalKind, OrgUnit, PhaseId, PhaseRef, PhaseStatus, SchedulingConfig, User, UserId,
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

/// Planner avec une unité Mon-Fri 09:00-17:30 et un utilisateur dedans.
fn setup() -> (Planner, UserId) {
    let mut planner = Planner::new();
    let unit = OrgUnit::new("paris");
    let unit_id = unit.id.clone();
    planner.workspace_mut().units.push(unit);
    let mut alice = User::new("alice", "Alice");
    alice.units.push(unit_id);
    let alice_id = alice.id.clone();
    planner.add_users(vec![alice]);
    (planner, alice_id)
}

// Semaine de référence : lundi 2025-03-03 .. vendredi 2025-03-07.

#[test]
fn encompassing_split_mid_window_start() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 8, 0),
        utc(2025, 3, 7, 18, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    // la plage démarre en pleine fenêtre de travail : le bord coupé ferme
    // la journée à 17:30 ; la reprise se fait jeudi à l'ouverture
    let out = p
        .clear_range(
            &alice,
            utc(2025, 3, 5, 13, 0),
            utc(2025, 3, 5, 23, 59),
            ClearOptions::default(),
        )
        .unwrap();

    assert_eq!(out.affected.len(), 1);
    assert_eq!(out.created.len(), 2);
    assert_eq!(out.created[0].start, utc(2025, 3, 3, 8, 0));
    assert_eq!(out.created[0].end, utc(2025, 3, 5, 17, 30));
    assert_eq!(out.created[1].start, utc(2025, 3, 6, 9, 0));
    assert_eq!(out.created[1].end, utc(2025, 3, 7, 18, 0));
}

#[test]
fn encompassing_split_midnight_range() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 8, 0),
        utc(2025, 3, 7, 18, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    let out = p
        .clear_days(&alice, date(2025, 3, 5), date(2025, 3, 5), ClearOptions::default())
        .unwrap();

    // bord de minuit calé sur l'ouverture du mercredi, reprise jeudi 09:00
    assert_eq!(out.created.len(), 2);
    assert_eq!(out.created[0].end, utc(2025, 3, 5, 9, 0));
    assert_eq!(out.created[1].start, utc(2025, 3, 6, 9, 0));

    // plus aucun créneau pendant les heures ouvrées du mercredi
    let covered = p
        .workspace()
        .intervals_for(&alice)
        .any(|i| i.overlaps_range(utc(2025, 3, 5, 9, 0), utc(2025, 3, 6, 0, 0)));
    assert!(!covered);
}

#[test]
fn clear_is_idempotent() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 8, 0),
        utc(2025, 3, 7, 18, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    let first = p
        .clear_days(&alice, date(2025, 3, 5), date(2025, 3, 5), ClearOptions::default())
        .unwrap();
    assert_eq!(first.affected.len(), 1);

    let second = p
        .clear_days(&alice, date(2025, 3, 5), date(2025, 3, 5), ClearOptions::default())
        .unwrap();
    assert!(second.affected.is_empty());
    assert!(second.created.is_empty());
}

#[test]
fn tail_shorter_than_15_minutes_is_dropped() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 10, 0),
        utc(2025, 3, 5, 9, 10),
        delivery(PhaseStatus::SCHEDULED_TENTATIVE),
    )
    .unwrap();

    // reprise mercredi 09:00 → reliquat de 10 minutes, jeté
    let out = p
        .clear_days(&alice, date(2025, 3, 4), date(2025, 3, 4), ClearOptions::default())
        .unwrap();
    assert_eq!(out.affected.len(), 1);
    assert!(out.created.is_empty());
    assert_eq!(p.workspace().intervals_for(&alice).count(), 0);
}

#[test]
fn tail_longer_than_15_minutes_is_kept() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 10, 0),
        utc(2025, 3, 5, 12, 0),
        delivery(PhaseStatus::SCHEDULED_TENTATIVE),
    )
    .unwrap();

    let out = p
        .clear_days(&alice, date(2025, 3, 4), date(2025, 3, 4), ClearOptions::default())
        .unwrap();
    assert_eq!(out.created.len(), 1);
    assert_eq!(out.created[0].start, utc(2025, 3, 5, 9, 0));
    assert_eq!(out.created[0].end, utc(2025, 3, 5, 12, 0));
}

#[test]
fn fully_inside_interval_is_deleted() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 4, 10, 0),
        utc(2025, 3, 4, 10, 10),
        delivery(PhaseStatus::SCHEDULED_TENTATIVE),
    )
    .unwrap();

    let out = p
        .clear_days(&alice, date(2025, 3, 4), date(2025, 3, 4), ClearOptions::default())
        .unwrap();
    assert_eq!(out.affected.len(), 1);
    assert!(out.created.is_empty());
    assert_eq!(p.workspace().intervals_for(&alice).count(), 0);
}

#[test]
fn ignore_working_hours_resumes_at_midnight() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 8, 0),
        utc(2025, 3, 7, 18, 0),
        delivery(PhaseStatus::SCHEDULED_CONFIRMED),
    )
    .unwrap();

    let out = p
        .clear_days(
            &alice,
            date(2025, 3, 5),
            date(2025, 3, 5),
            ClearOptions {
                respect_working_hours: false,
            },
        )
        .unwrap();
    assert_eq!(out.created[1].start, utc(2025, 3, 6, 0, 0));
}

#[test]
fn comment_intervals_split_like_any_other_kind() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 8, 0),
        utc(2025, 3, 7, 18, 0),
        IntervalKind::Comment {
            note: "demi-journée client".into(),
        },
    )
    .unwrap();

    let out = p
        .clear_days(&alice, date(2025, 3, 5), date(2025, 3, 5), ClearOptions::default())
        .unwrap();
    assert_eq!(out.created.len(), 2);
    assert!(out.created.iter().all(|i| i.kind.is_comment()));
    assert_eq!(out.created[0].end, utc(2025, 3, 5, 9, 0));
    assert_eq!(out.created[1].start, utc(2025, 3, 6, 9, 0));
}

#[test]
fn no_overlap_is_a_noop() {
    let (mut p, alice) = setup();
    p.book(
        &alice,
        utc(2025, 3, 3, 9, 0),
        utc(2025, 3, 3, 17, 0),
        delivery(PhaseStatus::SCHEDULED_TENTATIVE),
    )
    .unwrap();

    let out = p
        .clear_days(&alice, date(2025, 3, 6), date(2025, 3, 7), ClearOptions::default())
        .unwrap();
    assert!(out.affected.is_empty());
    assert!(out.created.is_empty());
    assert_eq!(p.workspace().intervals_for(&alice).count(), 1);
}

#[test]
fn reversed_range_is_rejected() {
    let (mut p, alice) = setup();
    let err = p
        .clear_range(
            &alice,
            utc(2025, 3, 5, 0, 0),
            utc(2025, 3, 5, 0, 0),
            ClearOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRange));

    let err = p
        .clear_days(&alice, date(2025, 3, 6), date(2025, 3, 5), ClearOptions::default())
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRange));
}

#[test]
fn unknown_owner_is_rejected() {
    let (mut p, _alice) = setup();
    let ghost = UserId::new("ghost");
    let err = p
        .clear_days(&ghost, date(2025, 3, 5), date(2025, 3, 5), ClearOptions::default())
        .unwrap_err();
    assert!(matches!(err, PlanError::UnknownUser(_)));
}

#[test]
fn leave_limit_is_enforced_when_configured() {
    let mut planner = Planner::with_config(SchedulingConfig {
        leave_limit_days: Some(5),
        ..SchedulingConfig::default()
    });
    let bob = User::new("bob", "Bob");
    let bob_id = bob.id.clone();
    planner.add_users(vec![bob]);

    // semaine complète : 5 jours, dans le plafond
    planner
        .book(
            &bob_id,
            utc(2025, 3, 3, 0, 0),
            utc(2025, 3, 8, 0, 0),
            IntervalKind::Leave,
        )
        .unwrap();

    let err = planner
        .book(
            &bob_id,
            utc(2025, 3, 10, 0, 0),
            utc(2025, 3, 11, 0, 0),
            IntervalKind::Leave,
        )
        .unwrap_err();
    assert!(matches!(err, PlanError::LeaveLimitExceeded { .. }));
}
