use clap::{Parser, Subcommand};
use dosing_core::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dosecal")]
#[command(about = "Laser therapy dosing schedule generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dosing schedule
    Schedule {
        /// First requested treatment date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Number of doses in the protocol
        #[arg(long, allow_hyphen_values = true)]
        doses: i64,

        /// Interval between doses ("+3 days", "1w", "mon,thu")
        #[arg(long, allow_hyphen_values = true)]
        every: String,

        /// Clinic slug (unknown slugs use the default clinic)
        #[arg(long)]
        clinic: Option<String>,

        /// Preferred dose time (HH:MM), otherwise the clinic default
        #[arg(long)]
        time: Option<String>,

        /// Label language (en, es)
        #[arg(long)]
        locale: Option<String>,

        /// Print slots as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a clinic-local date and time as a floating calendar timestamp
    Encode {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Time (HH:MM or HH:MM:SS)
        #[arg(long)]
        time: String,
    },

    /// List registered clinics
    Clinics,
}

fn main() -> Result<()> {
    dosing_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Schedule {
            start,
            doses,
            every,
            clinic,
            time,
            locale,
            json,
        } => {
            let registry = config.build_registry()?;
            let locale = match locale {
                Some(code) => code.parse::<Locale>().map_err(Error::Config)?,
                None => config.schedule.default_locale,
            };
            let input = LaserPrescriptionInput {
                clinic,
                start_date: parse_date(&start)?,
                protocol: DoseProtocol {
                    dose_count: u32::try_from(doses).map_err(|_| {
                        Error::InvalidProtocol(format!(
                            "dose count {} must be a positive integer",
                            doses
                        ))
                    })?,
                    interval: every.parse()?,
                },
                preferred_time: time.as_deref().map(parse_time).transpose()?,
                locale,
            };
            cmd_schedule(&registry, &input, json)
        }
        Commands::Encode { date, time } => {
            println!("{}", ics::encode_str(&date, &time)?);
            Ok(())
        }
        Commands::Clinics => {
            let registry = config.build_registry()?;
            cmd_clinics(&registry, config.schedule.default_locale);
            Ok(())
        }
    }
}

/// One slot plus its calendar timestamps, as printed by `--json`
#[derive(Serialize)]
struct ScheduledDose<'a> {
    #[serde(flatten)]
    slot: &'a DoseSlot,
    #[serde(flatten)]
    times: EventTimes,
}

fn cmd_schedule(registry: &ClinicRegistry, input: &LaserPrescriptionInput, json: bool) -> Result<()> {
    let clinic = registry.resolve(input.clinic.as_deref());
    tracing::debug!(
        "Requested clinic {:?} resolved to '{}'",
        input.clinic,
        clinic.slug
    );
    let slots = build_schedule(input, clinic)?;

    let mut doses = Vec::with_capacity(slots.len());
    for slot in &slots {
        doses.push(ScheduledDose {
            slot,
            times: event_times(slot, clinic.appointment_minutes)?,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&doses)?);
        return Ok(());
    }

    println!(
        "{} ({}): {} doses, {}",
        clinic.branding.display_name.resolve(input.locale),
        clinic.slug,
        slots.len(),
        input.protocol.interval
    );
    println!();
    for dose in &doses {
        println!(
            "  {:>3}  {}  {}  {:<16}  {}",
            dose.slot.index,
            dose.slot.date,
            types::hhmm::format(&dose.slot.time),
            dose.slot.label.as_deref().unwrap_or(""),
            dose.times.start
        );
    }

    Ok(())
}

fn cmd_clinics(registry: &ClinicRegistry, locale: Locale) {
    let fallback = registry.fallback();
    let rows = registry
        .clinics()
        .into_iter()
        .map(|c| (c, ""))
        .chain(std::iter::once((fallback, " (fallback)")));

    for (clinic, note) in rows {
        let closed: Vec<String> = clinic.closed_weekdays.iter().map(|d| d.to_string()).collect();
        println!(
            "{}{}: {}",
            clinic.slug,
            note,
            clinic.branding.display_name.resolve(locale)
        );
        println!(
            "    hours {}-{}, doses at {}, closed {}",
            types::hhmm::format(&clinic.hours.opens),
            types::hhmm::format(&clinic.hours.closes),
            types::hhmm::format(&clinic.default_dose_time),
            if closed.is_empty() {
                "never".to_string()
            } else {
                closed.join(",")
            }
        );
    }
}
