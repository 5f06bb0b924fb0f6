#![forbid(unsafe_code)]
//! Dispo — bibliothèque de disponibilité et de charge pour le staffing (sans BD).
//!
//! - Calendrier par utilisateur : créneaux de delivery, projets internes, congés, commentaires.
//! - Découpe de créneaux sur une plage de dates, calée sur les horaires de travail de l'unité.
//! - Jours ouvrés par unité (jours fériés par pays inclus).
//! - Classification jour par jour et agrégation d'équipe en lot.
//! - Tout en UTC ; parsing RFC3339 ; affichage local en dehors de la lib.

pub mod calendar;
pub mod engine;
pub mod io;
pub mod model;
pub mod report;
pub mod storage;

pub use calendar::{holiday_dates, working_days, HolidayCache};
pub use engine::{
    BulkSource, ClearOptions, DayClass, DayCounts, MemberProfile, Percentages, PlanError, Planner,
    RangeClearOutcome, TeamSummary, TeamUtilization, UpcomingWindow, UserAvailability,
    WindowUtilization,
};
pub use model::{
    CountryCode, DeliveryRole, Holiday, Interval, IntervalId, IntervalKind, OrgUnit, PhaseId,
    PhaseRef, PhaseStatus, ProjectId, SchedulingConfig, UnitId, User, UserId, WorkingDaysConfig,
    WorkingHoursWindow, Workspace,
};
pub use report::{ReportRenderer, TextReport};
pub use storage::{JsonStorage, Storage};
