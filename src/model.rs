use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identifiant fort pour User
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Interval
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntervalId(String);

impl IntervalId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour OrgUnit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(String);

impl UnitId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Code pays ISO 3166-1 alpha-2, normalisé en majuscules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_ascii_uppercase())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Référence opaque vers une phase de mission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(String);

impl PhaseId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Référence opaque vers un projet interne.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Statut ordonné d'une phase. Le moteur ne compare que l'ordinal
/// au seuil "confirmé" ; aucune autre sémantique n'est portée ici.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PhaseStatus(pub i16);

impl PhaseStatus {
    pub const PROPOSED: Self = Self(10);
    pub const SCHEDULED_TENTATIVE: Self = Self(30);
    pub const SCHEDULED_CONFIRMED: Self = Self(40);
}

/// Lien vers une phase : seul `status` est lu par le moteur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRef {
    pub id: PhaseId,
    pub status: PhaseStatus,
}

/// Rôle tenu sur un créneau de delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryRole {
    Lead,
    Consultant,
    Shadow,
}

/// Nature d'un créneau. Union fermée : le matching est exhaustif partout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalKind {
    Delivery {
        phase: PhaseRef,
        role: Option<DeliveryRole>,
    },
    InternalProject {
        project: ProjectId,
    },
    Leave,
    Comment {
        note: String,
    },
    Other,
}

impl IntervalKind {
    pub fn is_comment(&self) -> bool {
        matches!(self, IntervalKind::Comment { .. })
    }
    pub fn is_leave(&self) -> bool {
        matches!(self, IntervalKind::Leave)
    }
}

/// Créneau calendaire d'un utilisateur (UTC, `start < end`).
/// Les créneaux d'un même owner peuvent se chevaucher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: IntervalId,
    pub owner: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: IntervalKind,
}

impl Interval {
    /// Crée un créneau en validant que `end > start`.
    pub fn new(
        owner: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        kind: IntervalKind,
    ) -> Result<Self, String> {
        if end <= start {
            return Err("end must be strictly after start".to_string());
        }
        Ok(Self {
            id: IntervalId::random(),
            owner,
            start,
            end,
            kind,
        })
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Chevauche-t-il la plage `[start, end)` ?
    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// L'instant `t` est-il couvert (bornes incluses) ?
    pub fn covers_instant(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && self.end >= t
    }

    /// Copie du créneau sur de nouvelles bornes, owner et kind conservés.
    pub fn replica(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: IntervalId::random(),
            owner: self.owner.clone(),
            start,
            end,
            kind: self.kind.clone(),
        }
    }
}

/// Fenêtre d'horaires de travail d'une unité (heure locale de l'unité,
/// portée telle quelle en UTC : une seule fenêtre par unité).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for WorkingHoursWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid default opening time"),
            end: NaiveTime::from_hms_opt(17, 30, 0).expect("valid default closing time"),
        }
    }
}

/// Jours ouvrés d'une unité, numérotation ISO (lundi = 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDaysConfig {
    pub weekdays: BTreeSet<u8>,
}

impl WorkingDaysConfig {
    pub fn new<I: IntoIterator<Item = u8>>(days: I) -> Self {
        Self {
            weekdays: days.into_iter().filter(|d| (1..=7).contains(d)).collect(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let iso = date.weekday().number_from_monday() as u8;
        self.weekdays.contains(&iso)
    }
}

impl Default for WorkingDaysConfig {
    fn default() -> Self {
        Self::new(1..=5)
    }
}

/// Unité organisationnelle (bureau, practice…).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: UnitId,
    pub name: String,
    #[serde(default)]
    pub working_days: WorkingDaysConfig,
    #[serde(default)]
    pub hours: WorkingHoursWindow,
    #[serde(default)]
    pub country: Option<CountryCode>,
}

impl OrgUnit {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: UnitId::random(),
            name: name.into(),
            working_days: WorkingDaysConfig::default(),
            hours: WorkingHoursWindow::default(),
            country: None,
        }
    }
}

/// Consultant. `units` ordonné, la première entrée est l'unité principale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub handle: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<UnitId>,
    #[serde(default)]
    pub country: Option<CountryCode>,
}

impl User {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D) -> Self {
        Self {
            id: UserId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            units: Vec::new(),
            country: None,
        }
    }
}

/// Jour férié. `country = None` : férié global, tous pays confondus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default)]
    pub country: Option<CountryCode>,
    pub name: String,
}

/// Réglages de site passés explicitement au moteur (pas d'état global).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    pub default_hours: WorkingHoursWindow,
    pub default_working_days: WorkingDaysConfig,
    /// Seuil à partir duquel une phase liée compte comme delivery confirmé.
    pub confirmed_threshold: PhaseStatus,
    /// Plafond annuel de jours de congé, si le site l'impose.
    #[serde(default)]
    pub leave_limit_days: Option<u32>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_hours: WorkingHoursWindow::default(),
            default_working_days: WorkingDaysConfig::default(),
            confirmed_threshold: PhaseStatus::SCHEDULED_CONFIRMED,
            leave_limit_days: None,
        }
    }
}

/// Espace de travail complet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Workspace {
    pub users: Vec<User>,
    pub units: Vec<OrgUnit>,
    pub holidays: Vec<Holiday>,
    pub intervals: Vec<Interval>,
}

impl Workspace {
    pub fn find_user_by_handle<'a>(&'a self, handle: &str) -> Option<&'a User> {
        self.users.iter().find(|u| u.handle == handle)
    }
    pub fn find_user_by_id<'a>(&'a self, id: &UserId) -> Option<&'a User> {
        self.users.iter().find(|u| &u.id == id)
    }
    pub fn find_unit<'a>(&'a self, id: &UnitId) -> Option<&'a OrgUnit> {
        self.units.iter().find(|u| &u.id == id)
    }
    pub fn find_unit_by_name<'a>(&'a self, name: &str) -> Option<&'a OrgUnit> {
        self.units.iter().find(|u| u.name == name)
    }
    pub fn primary_unit<'a>(&'a self, user: &User) -> Option<&'a OrgUnit> {
        user.units.first().and_then(|id| self.find_unit(id))
    }
    pub fn intervals_for<'a>(&'a self, owner: &UserId) -> impl Iterator<Item = &'a Interval> {
        let owner = owner.clone();
        self.intervals.iter().filter(move |i| i.owner == owner)
    }
}
