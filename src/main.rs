use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinica_core::config::{ensure_dir, flag_from_env_value};
use clinica_core::constants::{DEFAULT_DATA_DIR, SESSIONS_HIDDEN_COLUMNS_KEY};
use clinica_core::detail::into_form;
use clinica_core::preferences::{ColumnVisibility, FilePreferenceStore};
use clinica_core::subjects::{FileSubjectDirectory, SubjectDirectory};
use clinica_core::{
    Anamnese, CoreConfig, FieldPatch, FileSubmissionStore, RecordView, validate_full,
    validate_minimal,
};
use clinica_detail::AnamneseDetail;

mod script;

use script::{RunOutcome, Script, ScriptRunner};

#[derive(Parser)]
#[command(name = "clinica")]
#[command(about = "Anamnese intake CLI")]
struct Cli {
    /// Data directory (overrides CLINICA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an empty anamnese document
    Template,
    /// Run an intake script
    Run {
        /// YAML script file
        script: PathBuf,
        /// Submission directory (default: <data dir>/submissions)
        #[arg(long)]
        out: Option<PathBuf>,
        /// YAML subjects file for `selectSubject` steps
        #[arg(long)]
        subjects: Option<PathBuf>,
    },
    /// Validate an anamnese document (JSON or YAML)
    Validate {
        document: PathBuf,
        /// Run the full pass instead of the minimal one
        #[arg(long)]
        full: bool,
    },
    /// Open a stored detail record in edit mode, apply changes and save it
    EditDetail {
        /// Detail record (JSON or YAML)
        detail: PathBuf,
        /// Field change as `path=json`, repeatable
        #[arg(long = "set", value_name = "PATH=VALUE")]
        sets: Vec<String>,
    },
    /// Show or change the sessions table column visibility
    Columns {
        #[arg(long)]
        show: Vec<String>,
        #[arg(long)]
        hide: Vec<String>,
    },
}

/// Entry point for the `clinica` CLI.
///
/// # Environment Variables
/// - `CLINICA_DATA_DIR`: data directory (default: "clinica_data")
/// - `CLINICA_PREFERENCES_FILE`: preferences JSON (default: "<data dir>/preferences.json")
/// - `CLINICA_SUBJECTS_FILE`: YAML subjects list used by intake scripts
/// - `CLINICA_SKIP_FULL_VALIDATION`: whether submissions skip the full pass (default: true)
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinica=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Template) => {
            println!("{}", Anamnese::default().to_json()?);
        }
        Some(Commands::Run {
            script,
            out,
            subjects,
        }) => {
            let cfg = resolve_config(cli.data_dir, subjects)?;
            run_script(&cfg, &script, out)?;
        }
        Some(Commands::Validate { document, full }) => validate(&document, full)?,
        Some(Commands::EditDetail { detail, sets }) => {
            let cfg = resolve_config(cli.data_dir, None)?;
            edit_detail(&cfg, &detail, &sets)?;
        }
        Some(Commands::Columns { show, hide }) => {
            let cfg = resolve_config(cli.data_dir, None)?;
            columns(&cfg, &show, &hide);
        }
        None => {
            println!("Use 'clinica --help' for commands");
        }
    }

    Ok(())
}

/// Resolves [`CoreConfig`] once from flags and the environment.
fn resolve_config(
    data_dir: Option<PathBuf>,
    subjects: Option<PathBuf>,
) -> anyhow::Result<CoreConfig> {
    let data_dir = data_dir
        .or_else(|| std::env::var("CLINICA_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    ensure_dir(&data_dir)?;

    let preferences = std::env::var("CLINICA_PREFERENCES_FILE").ok().map(PathBuf::from);
    let subjects =
        subjects.or_else(|| std::env::var("CLINICA_SUBJECTS_FILE").ok().map(PathBuf::from));
    let skip_full_validation =
        flag_from_env_value(std::env::var("CLINICA_SKIP_FULL_VALIDATION").ok(), true)?;

    Ok(CoreConfig::new(
        data_dir,
        preferences,
        subjects,
        skip_full_validation,
    )?)
}

fn run_script(cfg: &CoreConfig, path: &Path, out: Option<PathBuf>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let script = Script::parse(&text)?;

    let store = FileSubmissionStore::new(out.unwrap_or_else(|| cfg.submissions_dir()))?;
    let directory = cfg.subjects_file().map(FileSubjectDirectory::new).transpose()?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut runner = ScriptRunner::new(
        cfg.skip_full_validation(),
        base_dir,
        directory.as_ref().map(|d| d as &dyn SubjectDirectory),
        &store,
    );

    match runner.run(&script)? {
        RunOutcome::Submitted(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        RunOutcome::Rejected(messages) => {
            for message in &messages {
                eprintln!("{message}");
            }
            bail!("anamnese was not submitted");
        }
        RunOutcome::Incomplete => {
            let session = runner.session();
            let step = session.wizard().step();
            println!(
                "Stopped at step {} ({}) without finishing",
                step.number(),
                step.title()
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&session.form().document().summary())?
            );
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<Anamnese> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc = if is_yaml(path) {
        Anamnese::from_yaml(&text)?
    } else {
        Anamnese::from_json(&text)?
    };
    Ok(doc)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

fn validate(path: &Path, full: bool) -> anyhow::Result<()> {
    let doc = read_document(path)?;
    let report = if full {
        validate_full(&doc)
    } else {
        validate_minimal(&doc)
    };

    if report.is_valid() {
        println!("Valid");
        return Ok(());
    }
    for issue in report.issues() {
        eprintln!("{}", issue.display());
    }
    bail!("{} validation issue(s)", report.issues().len())
}

/// Parses `path=json`. A value that is not JSON is taken as a plain string.
fn parse_set(raw: &str) -> anyhow::Result<FieldPatch> {
    let Some((path, value)) = raw.split_once('=') else {
        bail!("expected PATH=VALUE, got '{raw}'");
    };
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok(FieldPatch::parse(path.trim(), value)?)
}

fn edit_detail(cfg: &CoreConfig, path: &Path, sets: &[String]) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let detail = if is_yaml(path) {
        AnamneseDetail::parse_yaml(&text)?
    } else {
        AnamneseDetail::parse_json(&text)?
    };
    let patches = sets
        .iter()
        .map(|raw| parse_set(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut view = RecordView::new(detail);
    if patches.is_empty() {
        println!("{}", into_form(view.detail()).document().to_json()?);
        return Ok(());
    }

    view.enter_edit();
    if let Some(draft) = view.draft_mut() {
        for patch in &patches {
            draft.apply(patch)?;
        }
    }

    let store = FileSubmissionStore::new(cfg.submissions_dir())?;
    if let Err(messages) = view.save(&store) {
        for message in &messages {
            eprintln!("{message}");
        }
        bail!("record {} was not updated", view.record_id());
    }
    println!("Record {} updated", view.record_id());
    Ok(())
}

fn columns(cfg: &CoreConfig, show: &[String], hide: &[String]) {
    let store = FilePreferenceStore::new(cfg.preferences_file());
    let mut visibility = ColumnVisibility::load(&store);
    for column in hide {
        visibility.hide(column, &store);
    }
    for column in show {
        visibility.show(column, &store);
    }

    let hidden: Vec<&str> = visibility.hidden().collect();
    if hidden.is_empty() {
        println!("{SESSIONS_HIDDEN_COLUMNS_KEY}: none");
    } else {
        println!("{SESSIONS_HIDDEN_COLUMNS_KEY}: {}", hidden.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_values_parse_as_json_or_text() {
        let patch = parse_set("cabecalho.parentesco=\"mae\"").expect("json string");
        assert_eq!(patch.value(), &serde_json::json!("mae"));

        let patch = parse_set("desenvolvimentoInicial.neuropsicomotor.rolou.naoRealiza=true")
            .expect("bool");
        assert_eq!(patch.value(), &serde_json::json!(true));

        let patch = parse_set("cabecalho.informante=Maria da Silva").expect("text");
        assert_eq!(patch.value(), &serde_json::json!("Maria da Silva"));

        assert!(parse_set("no-equals-sign").is_err());
    }

    #[test]
    fn yaml_is_detected_by_extension() {
        assert!(is_yaml(Path::new("a.yaml")));
        assert!(is_yaml(Path::new("dir/a.yml")));
        assert!(!is_yaml(Path::new("a.json")));
    }
}
