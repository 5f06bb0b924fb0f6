use crate::engine::{TeamUtilization, WindowUtilization};
use crate::model::Workspace;

/// Permet de customiser le rendu d'un agrégat (texte, mail, etc.).
pub trait ReportRenderer {
    fn render(&self, team: &TeamUtilization, workspace: &Workspace) -> String;
}

/// Gabarit texte simple destiné à la console ou à un futur mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render(&self, team: &TeamUtilization, workspace: &Workspace) -> String {
        let mut out = String::new();
        for (user_id, availability) in &team.by_user {
            let handle = workspace
                .find_user_by_id(user_id)
                .map(|u| u.handle.as_str())
                .unwrap_or_else(|| user_id.as_str());
            out.push_str(&format!(
                "{handle}: {} jour(s) ouvré(s), {} dispo ({}%), {} tentative, {} confirmé ({}%)\n",
                availability.working_days.len(),
                availability.counts.available,
                availability.pct.available,
                availability.counts.tentative,
                availability.counts.confirmed,
                availability.pct.confirmed,
            ));
        }
        out.push_str(&format!(
            "total: {} membre(s), {} jour(s) ouvré(s), {} planifié(s), utilisation {}%\n",
            team.summary.users,
            team.summary.working_days,
            team.summary.counts.scheduled(),
            team.summary.utilization_pct,
        ));
        out
    }
}

/// Rendu texte des fenêtres "disponibilité à venir".
pub fn render_windows(windows: &[WindowUtilization], workspace: &Workspace) -> String {
    let renderer = TextReport;
    let mut out = String::new();
    for window in windows {
        out.push_str(&format!(
            "== {} ({} → {}) ==\n",
            window.window.label(),
            window.from,
            window.to
        ));
        out.push_str(&renderer.render(&window.team, workspace));
    }
    out
}
