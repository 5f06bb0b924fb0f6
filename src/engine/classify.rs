use super::{day_end, day_start, DayClass, DayCounts, Percentages, PlanError, Planner, UserAvailability};
use crate::calendar;
use crate::model::{Interval, IntervalKind, PhaseStatus, UnitId, UserId, WorkingDaysConfig};
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, BTreeSet};

pub(super) fn availability(
    planner: &Planner,
    user_id: &UserId,
    from: NaiveDate,
    to: NaiveDate,
    unit: Option<&UnitId>,
) -> Result<UserAvailability, PlanError> {
    if from > to {
        return Err(PlanError::InvalidRange);
    }
    let workspace = planner.workspace();
    let user = workspace
        .find_user_by_id(user_id)
        .ok_or_else(|| PlanError::UnknownUser(user_id.as_str().to_string()))?;

    let unit = match unit {
        Some(id) => Some(
            workspace
                .find_unit(id)
                .ok_or_else(|| PlanError::UnknownUnit(id.as_str().to_string()))?,
        ),
        None => workspace.primary_unit(user),
    };
    let working_config = unit
        .map(|u| u.working_days.clone())
        .unwrap_or_else(|| planner.config().default_working_days.clone());
    // Le pays de l'utilisateur prime ; celui de l'unité sert de repli.
    let country = user
        .country
        .as_ref()
        .or_else(|| unit.and_then(|u| u.country.as_ref()));

    let holidays = calendar::holiday_dates(&workspace.holidays, country, from, to)?;
    let intervals: Vec<&Interval> = workspace
        .intervals_for(user_id)
        .filter(|i| i.overlaps_range(day_start(from), day_end(to)))
        .collect();

    classify_days(
        user_id.clone(),
        from,
        to,
        &working_config,
        &holidays,
        &intervals,
        planner.config().confirmed_threshold,
    )
}

/// Cœur de classification, partagé entre le chemin unitaire et le chemin
/// en lot pour que les deux rendent strictement le même résultat.
pub(super) fn classify_days(
    user: UserId,
    from: NaiveDate,
    to: NaiveDate,
    working_config: &WorkingDaysConfig,
    holidays: &BTreeSet<NaiveDate>,
    intervals: &[&Interval],
    confirmed_threshold: PhaseStatus,
) -> Result<UserAvailability, PlanError> {
    let working_days = calendar::working_days(working_config, from, to, holidays)?;
    let working_set: BTreeSet<NaiveDate> = working_days.iter().copied().collect();

    let mut days: BTreeMap<NaiveDate, DayClass> = BTreeMap::new();
    let mut counts = DayCounts::default();
    let mut raw = DayCounts::default();

    let mut current = from;
    loop {
        let class = if !working_set.contains(&current) {
            if working_config.contains(current) {
                DayClass::Holiday
            } else {
                DayClass::NonWorkingWeekday
            }
        } else {
            classify_working_day(current, intervals, confirmed_threshold, &mut counts, &mut raw)
        };
        days.insert(current, class);
        if current == to {
            break;
        }
        current = current
            .succ_opt()
            .context("date overflow")
            .map_err(PlanError::Other)?;
    }

    let total = working_days.len();
    let pct = Percentages {
        available: percentage(counts.available, total),
        non_delivery: percentage(counts.non_delivery, total),
        tentative: percentage(counts.tentative, total),
        confirmed: percentage(counts.confirmed, total),
    };

    Ok(UserAvailability {
        user,
        from,
        to,
        working_days,
        days,
        counts,
        raw,
        pct,
    })
}

/// Classe un jour ouvré via son instant de midi, seul représentant du
/// jour (stable face aux bords de créneaux à cheval sur minuit).
fn classify_working_day(
    day: NaiveDate,
    intervals: &[&Interval],
    confirmed_threshold: PhaseStatus,
    counts: &mut DayCounts,
    raw: &mut DayCounts,
) -> DayClass {
    let noon = day
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("noon is always valid"))
        .and_utc();

    let mut confirmed = false;
    let mut tentative = false;
    let mut non_delivery = false;
    for interval in intervals.iter().filter(|i| i.covers_instant(noon)) {
        match day_tag(interval, confirmed_threshold) {
            Some(DayClass::Confirmed) => confirmed = true,
            Some(DayClass::Tentative) => tentative = true,
            Some(DayClass::NonDelivery) => non_delivery = true,
            _ => {}
        }
    }

    if confirmed {
        raw.confirmed += 1;
    }
    if tentative {
        raw.tentative += 1;
    }
    if non_delivery {
        raw.non_delivery += 1;
    }

    let class = if confirmed {
        DayClass::Confirmed
    } else if tentative {
        DayClass::Tentative
    } else if non_delivery {
        DayClass::NonDelivery
    } else {
        raw.available += 1;
        DayClass::Available
    };
    match class {
        DayClass::Confirmed => counts.confirmed += 1,
        DayClass::Tentative => counts.tentative += 1,
        DayClass::NonDelivery => counts.non_delivery += 1,
        DayClass::Available => counts.available += 1,
        DayClass::Holiday | DayClass::NonWorkingWeekday => {}
    }
    class
}

/// Étiquette d'un créneau pour la journée. Les commentaires sont des
/// annotations : ils ne pèsent pas sur la disponibilité.
fn day_tag(interval: &Interval, confirmed_threshold: PhaseStatus) -> Option<DayClass> {
    match &interval.kind {
        IntervalKind::Delivery { phase, .. } => {
            if phase.status >= confirmed_threshold {
                Some(DayClass::Confirmed)
            } else {
                Some(DayClass::Tentative)
            }
        }
        IntervalKind::InternalProject { .. } | IntervalKind::Leave | IntervalKind::Other => {
            Some(DayClass::NonDelivery)
        }
        IntervalKind::Comment { .. } => None,
    }
}

/// `count / total * 100`, arrondi à une décimale, 0 si `total` est nul.
pub(super) fn percentage(count: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(f64::from(count) / total as f64 * 100.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
