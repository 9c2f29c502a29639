use anyhow::{bail, Context};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysinfo::System;

use claimdesk::attachments::{Attachment, AttachmentList, PreviewService};
use claimdesk::{
    AppResult, ClaimKind, Config, Created, DriverClaim, EventBus, FieldValue, FormRecord,
    HttpSubmitEndpoint, SubmitEndpoint, SubmitError, SubmitOutcome, ThirdPartyClaim,
    WizardEngine, WizardEvent,
};

const LOG_TARGET_STARTUP: &str = "claimdesk::startup";

const USAGE: &str = "Usage: claimdesk <driver|third-party> <answers.json> [--dry-run] [--attach FILE]...";

/// Parsed command line
struct Args {
    kind: ClaimKind,
    answers: PathBuf,
    dry_run: bool,
    attachments: Vec<PathBuf>,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> AppResult<Self> {
        let mut positional = Vec::new();
        let mut dry_run = false;
        let mut attachments = Vec::new();

        let mut args = args.skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dry-run" => dry_run = true,
                "--attach" => match args.next() {
                    Some(path) => attachments.push(PathBuf::from(path)),
                    None => bail!("--attach needs a file\n{}", USAGE),
                },
                _ => positional.push(arg),
            }
        }

        let [kind, answers] = positional.as_slice() else {
            bail!(USAGE);
        };

        Ok(Self {
            kind: kind.parse().map_err(anyhow::Error::msg)?,
            answers: PathBuf::from(answers),
            dry_run,
            attachments,
        })
    }
}

/// Initialize tracing with file rotation
///
/// Logs go to `<config dir>/claimdesk/logs/claimdesk.YYYY-MM-DD.log`.
/// `RUST_LOG` wins over the configured filter. Debug builds also log to
/// the console.
fn initialize_tracing(config: &Config) {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = Config::config_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|_| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "claimdesk.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting claimdesk v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

/// Local files stand in for browser blob URLs
struct FilePreviews;

impl PreviewService for FilePreviews {
    fn create(&self, attachment: &Attachment) -> String {
        format!("file://{}", attachment.name)
    }

    fn revoke(&self, url: &str) {
        tracing::debug!(target: "claimdesk::attachments", "Released {}", url);
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn collect_attachments(paths: &[PathBuf]) -> AppResult<AttachmentList> {
    let mut list = AttachmentList::new(Arc::new(FilePreviews));

    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Cannot read attachment {}", path.display()))?;
        let attachment = Attachment::new(path.display().to_string(), content_type(path), metadata.len());
        let url = list.add(attachment)?;
        println!("Attached {}", url);
    }

    Ok(list)
}

fn load_answers(path: &Path) -> AppResult<BTreeMap<String, FieldValue>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Answers in {} must be a JSON object of field values", path.display()))
}

/// Print everything the wizard announced since the last call
fn drain(events: &Receiver<WizardEvent>) {
    for event in events.try_iter() {
        match event {
            WizardEvent::Notice(notice) if notice.is_error() => eprintln!("✗ {}", notice),
            WizardEvent::Notice(notice) => println!("✓ {}", notice),
            other => tracing::debug!("{}", other.description()),
        }
    }
}

fn print_field_errors<R: FormRecord>(wizard: &WizardEngine<R>) {
    for (field, message) in wizard.state().field_errors() {
        eprintln!("  {}: {}", field, message);
    }
}

/// Fill in the answers, walk the steps the way a user would, then submit
fn run<R>(
    mut wizard: WizardEngine<R>,
    answers: BTreeMap<String, FieldValue>,
    endpoint: &dyn SubmitEndpoint<R>,
    events: &Receiver<WizardEvent>,
) -> AppResult<Created>
where
    R: FormRecord,
{
    for (name, value) in answers {
        wizard.update_field(&name, value);
    }

    while !wizard.is_last() {
        let step = wizard.current_step();
        if !wizard.go_next().is_moved() {
            drain(events);
            print_field_errors(&wizard);
            bail!("Step {} is incomplete", step);
        }
        drain(events);
    }

    let outcome = wizard.submit(endpoint);
    drain(events);

    match outcome {
        SubmitOutcome::Submitted(created) => Ok(created),
        SubmitOutcome::Blocked { failed_steps } => {
            print_field_errors(&wizard);
            bail!("Claim is incomplete: steps {:?} need attention", failed_steps)
        }
        SubmitOutcome::Failed(error) => Err(error).context("Claim submission failed"),
        SubmitOutcome::AlreadySubmitting => bail!("A submission is already in flight"),
    }
}

/// Print the request body `endpoint` would post instead of sending it
fn dry_run<R: Serialize>(endpoint: &HttpSubmitEndpoint, record: &R) -> Result<Created, SubmitError> {
    let body = endpoint.request_body(record)?;
    let body =
        serde_json::to_string_pretty(&body).map_err(|e| SubmitError::Encode(e.to_string()))?;
    println!("{}", body);
    Ok(Created::new("dry-run"))
}

/// Run the wizard against the configured endpoint, or print the payload
fn submit_claim<R>(
    wizard: WizardEngine<R>,
    answers: BTreeMap<String, FieldValue>,
    endpoint: HttpSubmitEndpoint,
    dry: bool,
    events: &Receiver<WizardEvent>,
) -> AppResult<Created>
where
    R: FormRecord + Serialize,
{
    if dry {
        let printer = |record: &R| dry_run(&endpoint, record);
        run(wizard, answers, &printer, events)
    } else {
        run(wizard, answers, &endpoint, events)
    }
}

fn main() -> AppResult<()> {
    let args = Args::parse(std::env::args())?;

    let config = Config::load()
        .with_context(|| format!("Failed to load {}", Config::config_path_display()))?;

    initialize_tracing(&config);
    log_runtime_environment();

    let answers = load_answers(&args.answers)?;
    let attachments = collect_attachments(&args.attachments)?;
    if !attachments.is_empty() {
        tracing::info!(
            count = attachments.len(),
            bytes = attachments.total_size(),
            "Attachments ready"
        );
    }

    let bus = Arc::new(EventBus::new());
    let (events, _subscription) = bus.subscribe();

    println!("{}", args.kind.title());

    // Previews stay live until the claim has gone out
    let created = match args.kind {
        ClaimKind::Driver => {
            let wizard = DriverClaim::wizard()?.with_sink(bus.clone());
            let endpoint =
                HttpSubmitEndpoint::driver_claims(&config).with_attachments(attachments.manifest());
            submit_claim(wizard, answers, endpoint, args.dry_run, &events)?
        }
        ClaimKind::ThirdParty => {
            let wizard = ThirdPartyClaim::wizard()?.with_sink(bus.clone());
            let endpoint = HttpSubmitEndpoint::third_party_claims(&config)
                .with_attachments(attachments.manifest());
            submit_claim(wizard, answers, endpoint, args.dry_run, &events)?
        }
    };
    drop(attachments);

    println!("Claim reference: {}", created.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> AppResult<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["claimdesk", "driver", "answers.json", "--dry-run"]).unwrap();
        assert_eq!(parsed.kind, ClaimKind::Driver);
        assert_eq!(parsed.answers, PathBuf::from("answers.json"));
        assert!(parsed.dry_run);

        let parsed = args(&[
            "claimdesk",
            "--attach",
            "front.jpg",
            "third-party",
            "a.json",
        ])
        .unwrap();
        assert_eq!(parsed.kind, ClaimKind::ThirdParty);
        assert_eq!(parsed.attachments, vec![PathBuf::from("front.jpg")]);
        assert!(!parsed.dry_run);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&["claimdesk"]).is_err());
        assert!(args(&["claimdesk", "boat", "a.json"]).is_err());
        assert!(args(&["claimdesk", "driver", "a.json", "--attach"]).is_err());
    }

    #[test]
    fn test_dry_run_prints_attached_files() {
        let dir = std::env::temp_dir().join(format!("claimdesk-attach-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let photo = dir.join("front.jpg");
        std::fs::write(&photo, [0u8; 64]).unwrap();

        let list = collect_attachments(&[photo.clone()]).unwrap();
        let endpoint = HttpSubmitEndpoint::new("http://api", "/claims", std::time::Duration::from_secs(1))
            .with_attachments(list.manifest());

        let claim = DriverClaim::default();
        let body = endpoint.request_body(&claim).unwrap();
        assert_eq!(body["attachments"][0]["name"], photo.display().to_string());
        assert_eq!(body["attachments"][0]["content_type"], "image/jpeg");
        assert_eq!(body["attachments"][0]["size"], 64);
        assert_eq!(dry_run(&endpoint, &claim).unwrap().id, "dry-run");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("front.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("report.pdf")), "application/pdf");
        assert_eq!(content_type(Path::new("notes")), "application/octet-stream");
    }
}
