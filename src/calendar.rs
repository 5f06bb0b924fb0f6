//! Calendrier : jours fériés par pays et jours ouvrés par unité.

use crate::engine::PlanError;
use crate::model::{CountryCode, Holiday, WorkingDaysConfig};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Fériés applicables à `country` sur `[from, to]` : union des fériés du
/// pays et des fériés globaux (`country = None`).
pub fn holiday_dates(
    holidays: &[Holiday],
    country: Option<&CountryCode>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeSet<NaiveDate>, PlanError> {
    if from > to {
        return Err(PlanError::InvalidRange);
    }
    let out = holidays
        .iter()
        .filter(|h| h.date >= from && h.date <= to)
        .filter(|h| h.country.is_none() || h.country.as_ref() == country)
        .map(|h| h.date)
        .collect();
    Ok(out)
}

/// Jours ouvrés de `[from, to]` : jours ISO retenus par la config, fériés déduits.
pub fn working_days(
    config: &WorkingDaysConfig,
    from: NaiveDate,
    to: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> Result<Vec<NaiveDate>, PlanError> {
    if from > to {
        return Err(PlanError::InvalidRange);
    }
    let mut out = Vec::new();
    let mut current = from;
    while current <= to {
        if config.contains(current) && !holidays.contains(&current) {
            out.push(current);
        }
        if current == to {
            break;
        }
        current = current
            .succ_opt()
            .context("date overflow")
            .map_err(PlanError::Other)?;
    }
    Ok(out)
}

/// Cache de fériés pour la durée d'une requête en lot : une résolution
/// par pays distinct, rien n'est conservé entre deux requêtes.
#[derive(Debug, Default)]
pub struct HolidayCache {
    rows: Vec<Holiday>,
    resolved: HashMap<Option<CountryCode>, BTreeSet<NaiveDate>>,
}

impl HolidayCache {
    pub fn from_rows(rows: Vec<Holiday>) -> Self {
        Self {
            rows,
            resolved: HashMap::new(),
        }
    }

    /// Ensemble férié (pays ∪ global) mémoïsé pour ce pays.
    pub fn resolve(&mut self, country: Option<&CountryCode>) -> &BTreeSet<NaiveDate> {
        let key = country.cloned();
        if !self.resolved.contains_key(&key) {
            let set: BTreeSet<NaiveDate> = self
                .rows
                .iter()
                .filter(|h| h.country.is_none() || h.country.as_ref() == country)
                .map(|h| h.date)
                .collect();
            self.resolved.insert(key.clone(), set);
        }
        &self.resolved[&key]
    }
}
