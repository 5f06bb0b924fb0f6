//! Agrégation d'équipe en lot : trois lectures groupées par appel
//! (profils, fériés, créneaux), puis tout se joue en mémoire.

use super::{
    classify, day_end, day_start, PlanError, TeamSummary, TeamUtilization, UpcomingWindow,
    UserAvailability, WindowUtilization,
};
use crate::calendar::HolidayCache;
use crate::model::{
    CountryCode, Holiday, Interval, OrgUnit, SchedulingConfig, UserId, WorkingDaysConfig,
    Workspace,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Profil résolu d'un membre pour la durée d'une requête en lot.
/// `working_days = None` : aucune unité, les défauts du site s'appliquent.
/// Pays de l'utilisateur et de l'unité portés séparément : l'un prime,
/// l'autre sert de repli (remplaçable par une unité imposée).
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub user: UserId,
    pub working_days: Option<WorkingDaysConfig>,
    pub user_country: Option<CountryCode>,
    pub unit_country: Option<CountryCode>,
}

/// Lectures groupées côté persistance. Chaque méthode vaut une requête :
/// l'agrégateur n'en fait qu'une de chaque par appel, quel que soit le
/// nombre d'utilisateurs ou de pays.
pub trait BulkSource {
    /// Unité principale + pays de chaque utilisateur demandé, en un lot.
    fn member_profiles(&self, users: &[UserId]) -> Vec<MemberProfile>;
    /// Fériés des pays demandés sur la plage, lignes globales incluses.
    fn holiday_rows(&self, countries: &[CountryCode], from: NaiveDate, to: NaiveDate)
        -> Vec<Holiday>;
    /// Créneaux des utilisateurs chevauchant `[start, end)`.
    fn interval_rows(
        &self,
        users: &[UserId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Interval>;
}

impl BulkSource for Workspace {
    fn member_profiles(&self, users: &[UserId]) -> Vec<MemberProfile> {
        users
            .iter()
            .map(|id| match self.find_user_by_id(id) {
                Some(user) => {
                    let unit = self.primary_unit(user);
                    MemberProfile {
                        user: id.clone(),
                        working_days: unit.map(|u| u.working_days.clone()),
                        user_country: user.country.clone(),
                        unit_country: unit.and_then(|u| u.country.clone()),
                    }
                }
                // ligne inconnue : on dégrade vers les défauts du site au
                // lieu de faire échouer tout le lot
                None => MemberProfile {
                    user: id.clone(),
                    working_days: None,
                    user_country: None,
                    unit_country: None,
                },
            })
            .collect()
    }

    fn holiday_rows(
        &self,
        countries: &[CountryCode],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<Holiday> {
        self.holidays
            .iter()
            .filter(|h| h.date >= from && h.date <= to)
            .filter(|h| match &h.country {
                None => true,
                Some(c) => countries.contains(c),
            })
            .cloned()
            .collect()
    }

    fn interval_rows(
        &self,
        users: &[UserId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Interval> {
        let wanted: HashSet<&UserId> = users.iter().collect();
        self.intervals
            .iter()
            .filter(|i| wanted.contains(&i.owner) && i.overlaps_range(start, end))
            .cloned()
            .collect()
    }
}

/// `unit` imposée : ses jours ouvrés remplacent ceux de l'unité principale
/// de chaque membre, et son pays sert de repli (le pays de l'utilisateur
/// prime toujours), comme pour le chemin unitaire.
pub fn team_utilization<S: BulkSource + ?Sized>(
    source: &S,
    users: &[UserId],
    from: NaiveDate,
    to: NaiveDate,
    unit: Option<&OrgUnit>,
    config: &SchedulingConfig,
) -> Result<TeamUtilization, PlanError> {
    if from > to {
        return Err(PlanError::InvalidRange);
    }
    if users.is_empty() {
        return Ok(TeamUtilization::default());
    }

    let profiles = source.member_profiles(users);
    let countries = distinct_countries(&profiles, unit);
    let mut cache = HolidayCache::from_rows(source.holiday_rows(&countries, from, to));
    let by_owner = group_by_owner(source.interval_rows(users, day_start(from), day_end(to)));

    aggregate(&profiles, &mut cache, &by_owner, from, to, unit, config)
}

pub fn upcoming_availability<S: BulkSource + ?Sized>(
    source: &S,
    users: &[UserId],
    today: NaiveDate,
    windows: &[UpcomingWindow],
    config: &SchedulingConfig,
) -> Result<Vec<WindowUtilization>, PlanError> {
    let Some(widest) = windows.iter().map(|w| w.weeks()).max() else {
        return Ok(Vec::new());
    };
    let anchor = most_recent_monday(today);
    let widest_to = anchor + Duration::days(i64::from(widest) * 7 - 1);

    // Une seule passe de lectures pour la fenêtre la plus large ; les
    // fenêtres plus courtes se découpent en mémoire.
    let profiles = source.member_profiles(users);
    let countries = distinct_countries(&profiles, None);
    let mut cache = HolidayCache::from_rows(source.holiday_rows(&countries, anchor, widest_to));
    let by_owner =
        group_by_owner(source.interval_rows(users, day_start(anchor), day_end(widest_to)));

    let mut out = Vec::with_capacity(windows.len());
    for window in windows {
        let to = anchor + Duration::days(i64::from(window.weeks()) * 7 - 1);
        let team = if users.is_empty() {
            TeamUtilization::default()
        } else {
            aggregate(&profiles, &mut cache, &by_owner, anchor, to, None, config)?
        };
        out.push(WindowUtilization {
            window: *window,
            from: anchor,
            to,
            team,
        });
    }
    Ok(out)
}

/// Cœur commun : classe chaque membre sur `[from, to]` avec les données
/// déjà chargées, puis somme les totaux d'équipe.
fn aggregate(
    profiles: &[MemberProfile],
    cache: &mut HolidayCache,
    by_owner: &HashMap<UserId, Vec<Interval>>,
    from: NaiveDate,
    to: NaiveDate,
    unit: Option<&OrgUnit>,
    config: &SchedulingConfig,
) -> Result<TeamUtilization, PlanError> {
    let mut summary = TeamSummary::default();
    let mut by_user: BTreeMap<UserId, UserAvailability> = BTreeMap::new();

    for profile in profiles {
        let working_config = match unit {
            Some(u) => u.working_days.clone(),
            None => profile
                .working_days
                .clone()
                .unwrap_or_else(|| config.default_working_days.clone()),
        };
        let holidays = cache.resolve(effective_country(profile, unit));

        let empty = Vec::new();
        let intervals: Vec<&Interval> = by_owner
            .get(&profile.user)
            .unwrap_or(&empty)
            .iter()
            .filter(|i| i.overlaps_range(day_start(from), day_end(to)))
            .collect();

        let availability = classify::classify_days(
            profile.user.clone(),
            from,
            to,
            &working_config,
            holidays,
            &intervals,
            config.confirmed_threshold,
        )?;

        summary.users += 1;
        summary.working_days += availability.working_days.len() as u32;
        summary.counts.add(&availability.counts);
        by_user.insert(profile.user.clone(), availability);
    }

    summary.utilization_pct =
        classify::percentage(summary.counts.confirmed, summary.working_days as usize);

    Ok(TeamUtilization { summary, by_user })
}

/// Pays effectif d'un membre : le sien d'abord, sinon celui de l'unité
/// imposée si présente, sinon celui de son unité principale.
fn effective_country<'a>(
    profile: &'a MemberProfile,
    unit: Option<&'a OrgUnit>,
) -> Option<&'a CountryCode> {
    profile.user_country.as_ref().or_else(|| match unit {
        Some(u) => u.country.as_ref(),
        None => profile.unit_country.as_ref(),
    })
}

fn distinct_countries(profiles: &[MemberProfile], unit: Option<&OrgUnit>) -> Vec<CountryCode> {
    let set: BTreeSet<CountryCode> = profiles
        .iter()
        .filter_map(|p| effective_country(p, unit).cloned())
        .collect();
    set.into_iter().collect()
}

fn group_by_owner(intervals: Vec<Interval>) -> HashMap<UserId, Vec<Interval>> {
    let mut out: HashMap<UserId, Vec<Interval>> = HashMap::new();
    for interval in intervals {
        out.entry(interval.owner.clone()).or_default().push(interval);
    }
    out
}

fn most_recent_monday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}
