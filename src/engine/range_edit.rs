use super::{ClearOptions, PlanError, Planner, RangeClearOutcome};
use crate::model::{Interval, IntervalId, UserId, WorkingHoursWindow};
use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::HashSet;

/// Reliquat minimal d'un créneau repris après la plage ; en dessous, on jette.
const MIN_REMAINDER_MINUTES: i64 = 15;

pub(super) fn clear_range(
    planner: &mut Planner,
    owner: &UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    opts: ClearOptions,
) -> Result<RangeClearOutcome, PlanError> {
    if end <= start {
        return Err(PlanError::InvalidRange);
    }
    let user = planner
        .workspace
        .find_user_by_id(owner)
        .ok_or_else(|| PlanError::UnknownUser(owner.as_str().to_string()))?;
    let window = planner.hours_for(user);

    // Phase de plan : tout est calculé avant la moindre mutation, pour
    // une visibilité tout-ou-rien.
    let mut affected: Vec<Interval> = Vec::new();
    let mut created: Vec<Interval> = Vec::new();
    for interval in planner
        .workspace
        .intervals
        .iter()
        .filter(|i| &i.owner == owner && i.overlaps_range(start, end))
    {
        let replacements = split_interval(interval, start, end, &window, opts)?;
        if is_noop(interval, &replacements) {
            continue;
        }
        affected.push(interval.clone());
        created.extend(replacements);
    }

    // Phase d'application : un seul balayage.
    let removed: HashSet<IntervalId> = affected.iter().map(|i| i.id.clone()).collect();
    planner
        .workspace
        .intervals
        .retain(|i| !removed.contains(&i.id));
    planner.workspace.intervals.extend(created.iter().cloned());
    planner.workspace.intervals.sort_by_key(|i| i.start);

    Ok(RangeClearOutcome { affected, created })
}

/// Remplacements d'un créneau chevauchant `[start, end)`. Quatre cas :
/// englobant (deux morceaux), début avant / fin dedans (morceau avant),
/// début dedans / fin après (morceau après, jeté sous 15 min),
/// entièrement dedans (aucun morceau).
fn split_interval(
    interval: &Interval,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: &WorkingHoursWindow,
    opts: ClearOptions,
) -> Result<Vec<Interval>, PlanError> {
    let starts_before = interval.start < start;
    let ends_after = interval.end > end;
    let mut out = Vec::new();

    if starts_before {
        // Le bord coupé ferme la journée de travail, jamais au-delà du
        // créneau d'origine.
        let cut = snap_end(start, window).min(interval.end);
        if cut > interval.start {
            out.push(interval.replica(interval.start, cut));
        }
    }

    if ends_after {
        let resume = next_boundary(end, window, opts.respect_working_hours)?;
        if interval.end > resume {
            let remainder = interval.end - resume;
            let keep = if starts_before {
                // cas englobant : durée positive suffit
                true
            } else {
                remainder >= Duration::minutes(MIN_REMAINDER_MINUTES)
            };
            if keep {
                out.push(interval.replica(resume, interval.end));
            }
        }
    }

    Ok(out)
}

/// Un remplacement identique au créneau d'origine est un non-événement ;
/// c'est ce qui rend les nettoyages répétés idempotents.
fn is_noop(interval: &Interval, replacements: &[Interval]) -> bool {
    replacements.len() == 1
        && replacements[0].start == interval.start
        && replacements[0].end == interval.end
}

/// Recale la fin du morceau "avant" sur les horaires de travail :
/// strictement dans la fenêtre → fermeture du jour ; à l'ouverture ou
/// avant → ouverture du jour ; à la fermeture ou après → inchangé.
fn snap_end(t: DateTime<Utc>, window: &WorkingHoursWindow) -> DateTime<Utc> {
    let tod = t.time();
    if tod >= window.end {
        t
    } else if tod > window.start {
        at(t.date_naive(), window.end)
    } else {
        at(t.date_naive(), window.start)
    }
}

/// Point de reprise après la plage : ouverture du lendemain calendaire,
/// ou minuit du lendemain si on ignore les horaires de travail.
fn next_boundary(
    t: DateTime<Utc>,
    window: &WorkingHoursWindow,
    respect_working_hours: bool,
) -> Result<DateTime<Utc>, PlanError> {
    let next = t
        .date_naive()
        .succ_opt()
        .context("date overflow")
        .map_err(PlanError::Other)?;
    let tod = if respect_working_hours {
        window.start
    } else {
        NaiveTime::MIN
    };
    Ok(at(next, tod))
}

fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}
