//! jobpost: export or share a composed job post image from the command line.
//!
//! Usage:
//!   jobpost export [--template KEY] [--surface FILE] [--format png|gif]
//!   jobpost share  [--template KEY] [--surface FILE] [--share-dir DIR]
//!   jobpost license set <KEY> | show | clear
//!   jobpost status
//!   jobpost templates

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use jobpost_export::capture::SurfaceCapturer;
use jobpost_export::clock::SystemClock;
use jobpost_export::license::HttpLicenseValidator;
use jobpost_export::platform::{DirectoryDownloads, DirectoryShareSheet, Platform};
use jobpost_export::rendering::EditorSurface;
use jobpost_export::store::{FileStore, KeyValueStore, LICENSE_KEY};
use jobpost_export::template::{self, Template, DEFAULT_TEMPLATE};
use jobpost_export::{ExportConfig, ExportOutcome, ImageActions, ImageFormat, RateLimiter, ShareOutcome};

#[derive(Parser)]
#[command(name = "jobpost", about = "Export and share job post images", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file; defaults apply to anything it leaves out
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local store holding the licence key and export log
    #[arg(long, global = true, default_value = "jobpost-store.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the job post as a download
    Export {
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,

        /// Editor surface as JSON; the editor defaults are used when omitted
        #[arg(short, long)]
        surface: Option<PathBuf>,

        /// png or gif; follows the surface's gradient motion when omitted
        #[arg(short, long)]
        format: Option<ImageFormat>,

        /// Download directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Share the job post the way its template prescribes
    Share {
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,

        #[arg(short, long)]
        surface: Option<PathBuf>,

        /// Folder acting as the native share target; sharing is unsupported without one
        #[arg(long)]
        share_dir: Option<PathBuf>,
    },

    /// Manage the stored licence key
    License {
        #[command(subcommand)]
        action: LicenseAction,
    },

    /// Show remaining exports this week
    Status,

    /// List available templates
    Templates,
}

#[derive(Subcommand)]
enum LicenseAction {
    /// Store a licence key
    Set { key: String },
    /// Show whether a key is stored
    Show,
    /// Remove the stored key
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    let store = Arc::new(FileStore::open(&cli.store)?);

    match cli.command {
        Commands::Export {
            template,
            surface,
            format,
            out,
        } => {
            let template = template::template(&template)?;
            let platform = Platform::new().with_downloads(Arc::new(DirectoryDownloads::new(out)));
            let (actions, motion) = build_actions(&config, store, template, surface.as_deref(), platform)?;
            match actions.handle_export(format, motion).await {
                ExportOutcome::Downloaded { file_name, .. } => println!("{}", file_name),
                ExportOutcome::RateLimited(reason) => {
                    eprintln!("export refused: {}", reason);
                    hint_checkout(&config, &reason);
                    std::process::exit(2);
                }
                ExportOutcome::Failed(why) => anyhow::bail!("export failed: {}", why),
            }
        }
        Commands::Share {
            template,
            surface,
            share_dir,
        } => {
            let template = template::template(&template)?;
            let mut platform = Platform::new();
            if let Some(dir) = share_dir {
                platform = platform.with_share_sheet(Arc::new(DirectoryShareSheet::new(dir)));
            }
            let (actions, motion) = build_actions(&config, store, template, surface.as_deref(), platform)?;
            match actions.handle_share(motion).await {
                ShareOutcome::Shared { file_name, .. } => println!("shared {}", file_name),
                ShareOutcome::OpenedLink(url) => println!("{}", url),
                ShareOutcome::Unsupported => std::process::exit(3),
                ShareOutcome::RateLimited(reason) => {
                    eprintln!("share refused: {}", reason);
                    hint_checkout(&config, &reason);
                    std::process::exit(2);
                }
                ShareOutcome::Failed(why) => anyhow::bail!("share failed: {}", why),
            }
        }
        Commands::License { action } => match action {
            LicenseAction::Set { key } => {
                let key = key.trim();
                anyhow::ensure!(!key.is_empty(), "licence key must not be empty");
                store.set(LICENSE_KEY, key)?;
                println!("licence key saved to {}", store.path().display());
            }
            LicenseAction::Show => match store.get(LICENSE_KEY)? {
                Some(key) => println!("licence key: {}", mask(&key)),
                None => println!("no licence key stored; buy one at {}", config.checkout_url),
            },
            LicenseAction::Clear => {
                store.remove(LICENSE_KEY)?;
                println!("licence key removed");
            }
        },
        Commands::Status => {
            let limiter = limiter(&config, store)?;
            println!(
                "{} of {} exports left this week",
                limiter.remaining()?,
                limiter.weekly_quota()
            );
        }
        Commands::Templates => {
            for t in template::templates() {
                println!("{:<16} {:<16} {}x{}", t.key, t.name, t.width, t.height);
            }
        }
    }
    Ok(())
}

type CliLimiter = RateLimiter<Arc<FileStore>, HttpLicenseValidator, SystemClock>;

fn limiter(config: &ExportConfig, store: Arc<FileStore>) -> anyhow::Result<CliLimiter> {
    let validator = HttpLicenseValidator::new(&config.license_api_url, config.license_timeout_ms)?;
    Ok(RateLimiter::new(store, validator, SystemClock, config.weekly_quota))
}

fn build_actions(
    config: &ExportConfig,
    store: Arc<FileStore>,
    template: &'static Template,
    surface: Option<&Path>,
    platform: Platform,
) -> anyhow::Result<(
    ImageActions<CliLimiter, SurfaceCapturer<SystemClock>, Platform>,
    jobpost_export::Motion,
)> {
    let surface = match surface {
        Some(path) => load_surface(path, template)?,
        None => EditorSurface::for_template(template),
    };
    let motion = surface.has_motion().into();

    let capturer = SurfaceCapturer::new(config.capture_options(), SystemClock, config.motion_period_ms);
    capturer.mount(surface)?;

    let actions = ImageActions::new(limiter(config, store)?, capturer, config.sequencer(), platform, template);
    Ok((actions, motion))
}

/// Read a surface JSON file, size it to `template` and load its logo pixels.
fn load_surface(path: &Path, template: &Template) -> anyhow::Result<EditorSurface> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut surface: EditorSurface =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    surface.resize_to(template);

    if let Some(logo) = surface.logo.as_mut() {
        logo.load_pixels(path.parent())?;
    }
    Ok(surface)
}

fn hint_checkout(config: &ExportConfig, reason: &jobpost_export::DenyReason) {
    use jobpost_export::DenyReason;
    if matches!(reason, DenyReason::MissingLicense | DenyReason::InvalidLicense(_)) {
        eprintln!("get a licence at {}", config.checkout_url);
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", visible)
}
