pub mod bulk;
mod classify;
mod range_edit;
mod types;

pub use bulk::{BulkSource, MemberProfile};
pub use types::{
    ClearOptions, DayClass, DayCounts, Percentages, PlanError, RangeClearOutcome, TeamSummary,
    TeamUtilization, UpcomingWindow, UserAvailability, WindowUtilization,
};

use crate::model::{
    Interval, IntervalId, IntervalKind, SchedulingConfig, UnitId, User, UserId,
    WorkingHoursWindow, Workspace,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Planner : encapsule un Workspace et les réglages de site.
#[derive(Debug, Default)]
pub struct Planner {
    workspace: Workspace,
    config: SchedulingConfig,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchedulingConfig) -> Self {
        Self {
            workspace: Workspace::default(),
            config,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }
    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    pub fn add_users(&mut self, users: Vec<User>) {
        self.workspace.users.extend(users);
    }

    /// Réserve un créneau pour `owner`. Applique le plafond annuel de
    /// congés si la config en impose un.
    pub fn book(
        &mut self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        kind: IntervalKind,
    ) -> Result<IntervalId, PlanError> {
        if end <= start {
            return Err(PlanError::InvalidRange);
        }
        if self.workspace.find_user_by_id(owner).is_none() {
            return Err(PlanError::UnknownUser(owner.as_str().to_string()));
        }
        if kind.is_leave() {
            self.check_leave_limit(owner, start, end)?;
        }
        let interval = Interval::new(owner.clone(), start, end, kind)
            .map_err(|_| PlanError::InvalidRange)?;
        let id = interval.id.clone();
        self.workspace.intervals.push(interval);
        Ok(id)
    }

    /// Supprime ou découpe les créneaux de `owner` pour qu'aucun ne reste
    /// dans `[start, end)`, bords recalés sur les horaires de l'unité.
    pub fn clear_range(
        &mut self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        opts: ClearOptions,
    ) -> Result<RangeClearOutcome, PlanError> {
        range_edit::clear_range(self, owner, start, end, opts)
    }

    /// Variante sur dates nues, normalisées en début/fin de journée.
    pub fn clear_days(
        &mut self,
        owner: &UserId,
        from: NaiveDate,
        to: NaiveDate,
        opts: ClearOptions,
    ) -> Result<RangeClearOutcome, PlanError> {
        if from > to {
            return Err(PlanError::InvalidRange);
        }
        range_edit::clear_range(self, owner, day_start(from), day_end(to), opts)
    }

    /// Disponibilité d'un utilisateur sur `[from, to]` (dates incluses).
    pub fn availability(
        &self,
        user: &UserId,
        from: NaiveDate,
        to: NaiveDate,
        unit: Option<&UnitId>,
    ) -> Result<UserAvailability, PlanError> {
        classify::availability(self, user, from, to, unit)
    }

    /// Agrégat d'équipe sur `[from, to]`, en nombre borné de lectures.
    /// `unit` impose ses jours ouvrés et son repli pays à tous les membres.
    pub fn team_utilization(
        &self,
        users: &[UserId],
        from: NaiveDate,
        to: NaiveDate,
        unit: Option<&UnitId>,
    ) -> Result<TeamUtilization, PlanError> {
        let unit = match unit {
            Some(id) => Some(
                self.workspace
                    .find_unit(id)
                    .ok_or_else(|| PlanError::UnknownUnit(id.as_str().to_string()))?,
            ),
            None => None,
        };
        bulk::team_utilization(&self.workspace, users, from, to, unit, &self.config)
    }

    /// Fenêtres prédéfinies ancrées au lundi le plus récent ; les données
    /// sont chargées une fois pour la fenêtre la plus large.
    pub fn upcoming_availability(
        &self,
        users: &[UserId],
        today: NaiveDate,
        windows: &[UpcomingWindow],
    ) -> Result<Vec<WindowUtilization>, PlanError> {
        bulk::upcoming_availability(&self.workspace, users, today, windows, &self.config)
    }

    /// Horaires applicables à `user` : unité principale, sinon défaut site.
    pub(crate) fn hours_for(&self, user: &User) -> WorkingHoursWindow {
        self.workspace
            .primary_unit(user)
            .map(|u| u.hours)
            .unwrap_or(self.config.default_hours)
    }

    fn check_leave_limit(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), PlanError> {
        let Some(limit) = self.config.leave_limit_days else {
            return Ok(());
        };
        let year = start.year();
        let booked: i64 = self
            .workspace
            .intervals_for(owner)
            .filter(|i| i.kind.is_leave() && i.start.year() == year)
            .map(|i| (i.end - i.start).num_days().max(1))
            .sum();
        let requested = booked + (end - start).num_days().max(1);
        if requested > i64::from(limit) {
            return Err(PlanError::LeaveLimitExceeded { requested, limit });
        }
        Ok(())
    }
}

/// Minuit du jour `d`.
pub(crate) fn day_start(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Dernière seconde du jour `d`.
pub(crate) fn day_end(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(23, 59, 59)
        .expect("end of day is always valid")
        .and_utc()
}
