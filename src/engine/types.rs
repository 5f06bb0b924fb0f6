use crate::model::{Interval, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Options de nettoyage de plage
#[derive(Debug, Clone, Copy)]
pub struct ClearOptions {
    /// Caler la reprise après la plage sur l'ouverture du jour suivant
    /// plutôt que sur minuit.
    pub respect_working_hours: bool,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            respect_working_hours: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("invalid date range: end must be after start")]
    InvalidRange,
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
    #[error("leave limit exceeded: {requested} day(s) booked against a limit of {limit}")]
    LeaveLimitExceeded { requested: i64, limit: u32 },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Résultat d'un nettoyage de plage : créneaux touchés (état avant
/// découpe) et créneaux de remplacement, pour l'audit côté appelant.
#[derive(Debug, Clone, Default)]
pub struct RangeClearOutcome {
    pub affected: Vec<Interval>,
    pub created: Vec<Interval>,
}

/// Classe unique d'une date. `Holiday` et `NonWorkingWeekday` ne
/// concernent que les dates hors jours ouvrés ; parmi les jours ouvrés la
/// précédence est Confirmed > Tentative > NonDelivery > Available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayClass {
    Holiday,
    NonWorkingWeekday,
    Available,
    NonDelivery,
    Tentative,
    Confirmed,
}

/// Compteurs de jours ouvrés par catégorie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounts {
    pub available: u32,
    pub non_delivery: u32,
    pub tentative: u32,
    pub confirmed: u32,
}

impl DayCounts {
    pub fn scheduled(&self) -> u32 {
        self.tentative + self.confirmed
    }

    pub fn add(&mut self, other: &DayCounts) {
        self.available += other.available;
        self.non_delivery += other.non_delivery;
        self.tentative += other.tentative;
        self.confirmed += other.confirmed;
    }
}

/// Pourcentages sur les jours ouvrés, arrondis à une décimale,
/// `0.0` quand il n'y a aucun jour ouvré.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentages {
    pub available: f64,
    pub non_delivery: f64,
    pub tentative: f64,
    pub confirmed: f64,
}

/// Disponibilité d'un utilisateur sur une plage de dates incluse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAvailability {
    pub user: UserId,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub working_days: Vec<NaiveDate>,
    /// Partition complète de la plage : chaque date a exactement une classe.
    pub days: BTreeMap<NaiveDate, DayClass>,
    /// Compteurs issus de la partition (la somme vaut `working_days.len()`).
    pub counts: DayCounts,
    /// Compteurs indépendants par catégorie, chevauchements possibles
    /// (diagnostic : un jour confirmé + interne compte dans les deux).
    pub raw: DayCounts,
    pub pct: Percentages,
}

impl UserAvailability {
    /// Pourcentage phare : jours confirmés sur jours ouvrés.
    pub fn utilization_pct(&self) -> f64 {
        self.pct.confirmed
    }
}

/// Totaux d'équipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub users: u32,
    pub working_days: u32,
    pub counts: DayCounts,
    pub utilization_pct: f64,
}

/// Agrégat d'équipe : totaux + détail par utilisateur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamUtilization {
    pub summary: TeamSummary,
    pub by_user: BTreeMap<UserId, UserAvailability>,
}

/// Fenêtres prédéfinies de disponibilité à venir, ancrées au lundi le
/// plus récent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpcomingWindow {
    ThisWeek,
    FourWeeks,
    EightWeeks,
    TwelveWeeks,
}

impl UpcomingWindow {
    pub const ALL: [UpcomingWindow; 4] = [
        UpcomingWindow::ThisWeek,
        UpcomingWindow::FourWeeks,
        UpcomingWindow::EightWeeks,
        UpcomingWindow::TwelveWeeks,
    ];

    pub fn weeks(&self) -> u32 {
        match self {
            UpcomingWindow::ThisWeek => 1,
            UpcomingWindow::FourWeeks => 4,
            UpcomingWindow::EightWeeks => 8,
            UpcomingWindow::TwelveWeeks => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpcomingWindow::ThisWeek => "this week",
            UpcomingWindow::FourWeeks => "4 weeks",
            UpcomingWindow::EightWeeks => "8 weeks",
            UpcomingWindow::TwelveWeeks => "12 weeks",
        }
    }
}

/// Agrégat d'équipe sur une fenêtre prédéfinie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowUtilization {
    pub window: UpcomingWindow,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub team: TeamUtilization,
}
