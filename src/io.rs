use crate::engine::TeamUtilization;
use crate::model::{CountryCode, Holiday, Workspace};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import de jours fériés depuis CSV : header `date,country,name`.
/// Un champ pays vide donne un férié global (tous pays).
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Holiday>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = rec.get(0).context("missing date")?.trim();
        if date.is_empty() {
            bail!("invalid holiday row (empty date)");
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date}"))?;
        let country = rec
            .get(1)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(CountryCode::new);
        let name = rec.get(2).map(str::trim).unwrap_or("").to_string();
        out.push(Holiday {
            date,
            country,
            name,
        });
    }
    Ok(out)
}

/// Export CSV d'un agrégat d'équipe :
/// header `handle,working_days,available,non_delivery,tentative,confirmed,utilization_pct`.
pub fn export_team_csv<P: AsRef<Path>>(
    path: P,
    team: &TeamUtilization,
    workspace: &Workspace,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "handle",
        "working_days",
        "available",
        "non_delivery",
        "tentative",
        "confirmed",
        "utilization_pct",
    ])?;
    for (user_id, availability) in &team.by_user {
        let handle = workspace
            .find_user_by_id(user_id)
            .map(|u| u.handle.as_str())
            .unwrap_or_else(|| user_id.as_str());
        let working = availability.working_days.len().to_string();
        let available = availability.counts.available.to_string();
        let non_delivery = availability.counts.non_delivery.to_string();
        let tentative = availability.counts.tentative.to_string();
        let confirmed = availability.counts.confirmed.to_string();
        let utilization = format!("{:.1}", availability.utilization_pct());
        w.write_record([
            handle,
            working.as_str(),
            available.as_str(),
            non_delivery.as_str(),
            tentative.as_str(),
            confirmed.as_str(),
            utilization.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
