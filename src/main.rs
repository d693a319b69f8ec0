// --- quickslot: horario colaborativo - Archivo principal ---

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::broadcast::Receiver;

use quickslot::store::{CourseUpdate, NewCourse, UndoAction};
use quickslot::{
    conflict_report, resolve_term, Broadcaster, ChangeEvent, Config, CurriculumCatalog,
    ScheduleStore,
};

#[derive(Debug, Parser)]
#[command(
    name = "quickslot",
    version,
    about = "Collaborative course schedule: store, change feed and conflict checker"
)]
struct Cli {
    /// Directorio con los schedule_<term>.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Catálogo curricular (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Término, p.ej. fall-2026
    #[arg(long, global = true)]
    term: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the conflict report for the term
    Conflicts,
    /// Print all sections of the term
    List,
    /// Assign a course to a slot (omit the slot to unschedule it)
    Move { course_id: String, slot: Option<String> },
    /// Add a new section; the section number is picked automatically
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        number: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        instructor: String,
        #[arg(long, default_value = "")]
        room: String,
        #[arg(long)]
        slot: Option<String>,
    },
    /// Edit course details
    Update {
        course_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
    },
    Delete { course_id: String },
    /// Apply an undo action given as JSON,
    /// e.g. {"type":"move","courseId":"ECON-205-1","slotId":null}
    Undo { action: String },
    Faculty {
        #[command(subcommand)]
        action: FacultyCommand,
    },
    /// Write the term's schedule as JSON (timestamped file name by default)
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum FacultyCommand {
    List,
    Add { name: String },
    Delete { name: String },
}

fn init_logging(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Imprime como líneas JSON los eventos que generó el comando
fn echo_events(rx: &mut Receiver<ChangeEvent>) {
    while let Ok(ev) = rx.try_recv() {
        match serde_json::to_string(&ev) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(d) = cli.data_dir {
        config.data_dir = d;
    }
    if let Some(c) = cli.catalog {
        config.catalog_path = c;
    }
    if let Some(l) = cli.log_level {
        config.log_level = l;
    }
    init_logging(&config.log_level);

    let term = resolve_term(cli.term.as_deref(), &config.default_term);
    let broadcaster = Broadcaster::new(config.event_capacity);
    let mut events = broadcaster.subscribe();
    let store = ScheduleStore::new(&config.data_dir, broadcaster);

    match cli.command {
        Command::Conflicts => {
            let catalog = CurriculumCatalog::load(&config.catalog_path)?;
            let report =
                conflict_report(&store, &catalog, Some(term.as_str()), &config.default_term)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::List => {
            let sections = store.sections_for_term(&term)?;
            println!("{}", serde_json::to_string_pretty(&sections)?);
        }
        Command::Move { course_id, slot } => {
            store.move_course(&term, &course_id, slot)?;
        }
        Command::Add { code, number, name, instructor, room, slot } => {
            let new = NewCourse { code, number, name, instructor, room, slot_id: slot };
            let course = store.add_course(&term, new)?;
            tracing::info!(course_id = %course.id, "added");
        }
        Command::Update { course_id, name, instructor, room, days, start_time, end_time } => {
            let updates = CourseUpdate { name, instructor, room, days, start_time, end_time };
            if updates.is_empty() {
                return Err("nothing to update".into());
            }
            store.update_course(&term, &course_id, updates)?;
        }
        Command::Delete { course_id } => {
            store.delete_course(&term, &course_id)?;
        }
        Command::Undo { action } => {
            let action: UndoAction = serde_json::from_str(&action)?;
            store.undo(&term, action)?;
        }
        Command::Faculty { action } => match action {
            FacultyCommand::List => {
                println!("{}", serde_json::to_string_pretty(&store.faculty(&term)?)?);
            }
            FacultyCommand::Add { name } => {
                store.add_faculty(&term, &name)?;
            }
            FacultyCommand::Delete { name } => {
                store.delete_faculty(&term, &name)?;
            }
        },
        Command::Export { out } => {
            let export = store.export_json(&term)?;
            let path = out.unwrap_or_else(|| PathBuf::from(&export.file_name));
            std::fs::write(&path, &export.bytes)?;
            println!("{}", path.display());
        }
    }

    echo_events(&mut events);
    Ok(())
}
