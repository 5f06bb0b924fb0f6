#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use dispo::{
    engine::{ClearOptions, Planner, UpcomingWindow},
    io,
    model::{
        CountryCode, DeliveryRole, IntervalKind, OrgUnit, PhaseId, PhaseRef, PhaseStatus,
        ProjectId, User, UserId, WorkingDaysConfig,
    },
    report::{render_windows, ReportRenderer, TextReport},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de suivi de disponibilité (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de workspace
    #[arg(long, global = true, default_value = "workspace.json")]
    workspace: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer une unité organisationnelle
    AddUnit {
        #[arg(long)]
        name: String,
        /// Jours ouvrés ISO "1,2,3,4,5" (lundi = 1)
        #[arg(long, default_value = "1,2,3,4,5")]
        days: String,
        /// Ouverture "HH:MM"
        #[arg(long, default_value = "09:00")]
        open: String,
        /// Fermeture "HH:MM"
        #[arg(long, default_value = "17:30")]
        close: String,
        /// Code pays ISO alpha-2
        #[arg(long)]
        country: Option<String>,
    },

    /// Créer un utilisateur
    AddUser {
        #[arg(long)]
        handle: String,
        #[arg(long)]
        name: String,
        /// Code pays ISO alpha-2
        #[arg(long)]
        country: Option<String>,
        /// Nom de l'unité principale
        #[arg(long)]
        unit: Option<String>,
    },

    /// Importer des jours fériés depuis un CSV `date,country,name`
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Réserver un créneau
    Book {
        #[arg(long)]
        user: String,
        /// RFC3339 UTC
        #[arg(long)]
        start: String,
        /// RFC3339 UTC
        #[arg(long)]
        end: String,
        /// delivery | internal | leave | comment | other
        #[arg(long, default_value = "delivery")]
        kind: String,
        /// Identifiant de phase (kind = delivery)
        #[arg(long)]
        phase: Option<String>,
        /// Statut ordinal de la phase (40 = confirmé)
        #[arg(long)]
        status: Option<i16>,
        /// Rôle tenu : lead | consultant | shadow
        #[arg(long)]
        role: Option<String>,
        /// Identifiant de projet (kind = internal)
        #[arg(long)]
        project: Option<String>,
        /// Texte libre (kind = comment)
        #[arg(long)]
        note: Option<String>,
    },

    /// Vider une plage de dates (découpe les créneaux qui débordent)
    ClearRange {
        #[arg(long)]
        user: String,
        /// Date incluse AAAA-MM-JJ
        #[arg(long)]
        from: String,
        /// Date incluse AAAA-MM-JJ
        #[arg(long)]
        to: String,
        /// Reprendre à minuit au lieu de l'ouverture du lendemain
        #[arg(long)]
        ignore_working_hours: bool,
    },

    /// Disponibilité d'un utilisateur sur une plage de dates
    Availability {
        #[arg(long)]
        user: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Agrégat d'équipe, optionnellement exporté en CSV
    Team {
        /// liste "handle1,handle2,..." (tous par défaut)
        #[arg(long)]
        people: Option<String>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Nom d'unité imposée à tous les membres (jours ouvrés + repli pays)
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Disponibilité à venir (semaine en cours, 4/8/12 semaines)
    Upcoming {
        /// liste "handle1,handle2,..." (tous par défaut)
        #[arg(long)]
        people: Option<String>,
        /// Date d'ancrage AAAA-MM-JJ (aujourd'hui par défaut)
        #[arg(long)]
        today: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.workspace)?;
    let mut planner = Planner::new();
    if let Ok(ws) = storage.load() {
        *planner.workspace_mut() = ws;
    }

    let code = match cli.cmd {
        Commands::AddUnit {
            name,
            days,
            open,
            close,
            country,
        } => {
            let mut unit = OrgUnit::new(name);
            unit.working_days = parse_days(&days)?;
            unit.hours.start = parse_time(&open)?;
            unit.hours.end = parse_time(&close)?;
            unit.country = country.map(CountryCode::new);
            planner.workspace_mut().units.push(unit);
            storage.save(planner.workspace())?;
            0
        }
        Commands::AddUser {
            handle,
            name,
            country,
            unit,
        } => {
            let mut user = User::new(handle, name);
            user.country = country.map(CountryCode::new);
            if let Some(unit_name) = unit {
                let unit_id = planner
                    .workspace()
                    .find_unit_by_name(&unit_name)
                    .map(|u| u.id.clone())
                    .ok_or_else(|| anyhow!("unknown unit: {unit_name}"))?;
                user.units.push(unit_id);
            }
            planner.add_users(vec![user]);
            storage.save(planner.workspace())?;
            0
        }
        Commands::ImportHolidays { csv } => {
            let holidays = io::import_holidays_csv(csv)?;
            println!("{} holiday(s) imported", holidays.len());
            planner.workspace_mut().holidays.extend(holidays);
            storage.save(planner.workspace())?;
            0
        }
        Commands::Book {
            user,
            start,
            end,
            kind,
            phase,
            status,
            role,
            project,
            note,
        } => {
            let owner = resolve_user(&planner, &user)?;
            let start = start.parse()?;
            let end = end.parse()?;
            let kind = build_kind(&kind, phase, status, role, project, note)?;
            let id = planner.book(&owner, start, end, kind)?;
            println!("booked {}", id.as_str());
            storage.save(planner.workspace())?;
            0
        }
        Commands::ClearRange {
            user,
            from,
            to,
            ignore_working_hours,
        } => {
            let owner = resolve_user(&planner, &user)?;
            let from: NaiveDate = from.parse()?;
            let to: NaiveDate = to.parse()?;
            let outcome = planner.clear_days(
                &owner,
                from,
                to,
                ClearOptions {
                    respect_working_hours: !ignore_working_hours,
                },
            )?;
            println!(
                "cleared: {} affected, {} created",
                outcome.affected.len(),
                outcome.created.len()
            );
            storage.save(planner.workspace())?;
            0
        }
        Commands::Availability { user, from, to } => {
            let owner = resolve_user(&planner, &user)?;
            let from: NaiveDate = from.parse()?;
            let to: NaiveDate = to.parse()?;
            let availability = planner.availability(&owner, from, to, None)?;
            println!(
                "{user}: {} working day(s) on {from} → {to}",
                availability.working_days.len()
            );
            println!(
                "available {} ({}%) | non-delivery {} ({}%) | tentative {} ({}%) | confirmed {} ({}%)",
                availability.counts.available,
                availability.pct.available,
                availability.counts.non_delivery,
                availability.pct.non_delivery,
                availability.counts.tentative,
                availability.pct.tentative,
                availability.counts.confirmed,
                availability.pct.confirmed,
            );
            0
        }
        Commands::Team {
            people,
            from,
            to,
            unit,
            out_csv,
        } => {
            let users = resolve_people(&planner, people)?;
            if users.is_empty() {
                eprintln!("no matching user");
                2
            } else {
                let from: NaiveDate = from.parse()?;
                let to: NaiveDate = to.parse()?;
                let unit_id = match unit {
                    Some(name) => Some(
                        planner
                            .workspace()
                            .find_unit_by_name(&name)
                            .map(|u| u.id.clone())
                            .ok_or_else(|| anyhow!("unknown unit: {name}"))?,
                    ),
                    None => None,
                };
                let team = planner.team_utilization(&users, from, to, unit_id.as_ref())?;
                if let Some(path) = out_csv {
                    io::export_team_csv(path, &team, planner.workspace())?;
                }
                print!("{}", TextReport.render(&team, planner.workspace()));
                0
            }
        }
        Commands::Upcoming { people, today } => {
            let users = resolve_people(&planner, people)?;
            if users.is_empty() {
                eprintln!("no matching user");
                2
            } else {
                let today = match today {
                    Some(d) => d.parse()?,
                    None => Utc::now().date_naive(),
                };
                let windows =
                    planner.upcoming_availability(&users, today, &UpcomingWindow::ALL)?;
                print!("{}", render_windows(&windows, planner.workspace()));
                0
            }
        }
    };

    std::process::exit(code);
}

fn resolve_user(planner: &Planner, handle: &str) -> Result<UserId> {
    planner
        .workspace()
        .find_user_by_handle(handle)
        .map(|u| u.id.clone())
        .ok_or_else(|| anyhow!("unknown user: {handle}"))
}

fn resolve_people(planner: &Planner, people: Option<String>) -> Result<Vec<UserId>> {
    let out = if let Some(list) = people {
        let mut out = Vec::new();
        for handle in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            out.push(resolve_user(planner, handle)?);
        }
        out
    } else {
        planner
            .workspace()
            .users
            .iter()
            .map(|u| u.id.clone())
            .collect()
    };
    Ok(out)
}

fn parse_days(raw: &str) -> Result<WorkingDaysConfig> {
    let mut days = Vec::new();
    for chunk in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let day: u8 = chunk.parse()?;
        if !(1..=7).contains(&day) {
            bail!("invalid ISO weekday: {day}");
        }
        days.push(day);
    }
    if days.is_empty() {
        bail!("at least one working day is required");
    }
    Ok(WorkingDaysConfig::new(days))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| anyhow!("invalid time (HH:MM): {raw}"))
}

fn build_kind(
    kind: &str,
    phase: Option<String>,
    status: Option<i16>,
    role: Option<String>,
    project: Option<String>,
    note: Option<String>,
) -> Result<IntervalKind> {
    let kind = match kind.to_ascii_lowercase().as_str() {
        "delivery" => IntervalKind::Delivery {
            phase: PhaseRef {
                id: PhaseId::new(phase.ok_or_else(|| anyhow!("--phase required for delivery"))?),
                status: status.map(PhaseStatus).unwrap_or(PhaseStatus::SCHEDULED_TENTATIVE),
            },
            role: match role.as_deref() {
                None => None,
                Some("lead") => Some(DeliveryRole::Lead),
                Some("consultant") => Some(DeliveryRole::Consultant),
                Some("shadow") => Some(DeliveryRole::Shadow),
                Some(other) => bail!("unknown role: {other}"),
            },
        },
        "internal" => IntervalKind::InternalProject {
            project: ProjectId::new(
                project.ok_or_else(|| anyhow!("--project required for internal"))?,
            ),
        },
        "leave" => IntervalKind::Leave,
        "comment" => IntervalKind::Comment {
            note: note.unwrap_or_default(),
        },
        "other" => IntervalKind::Other,
        other => bail!("unknown kind: {other}"),
    };
    Ok(kind)
}
