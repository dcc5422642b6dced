//! openpgp-wot CLI — `wot` command.
//!
//! Authenticates, identifies, looks up and lists certificate bindings in a
//! keyring directory using the web of trust.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use openpgp_wot::keyring::KeyringStore;
use openpgp_wot::time::{micros_to_rfc3339, rfc3339_to_micros};
use openpgp_wot::trust::FULLY_TRUSTED;
use openpgp_wot::{
    AuthenticationLevel, Binding, CertificateAuthority, Certification, Ed25519Verifier,
    Fingerprint, NetworkBuilder, NetworkMode, Path, QueryConfig, ReferenceTime, Root, Roots,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_keyring_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --keyring")?;
    Ok(PathBuf::from(home).join(".openpgp-wot").join("keyring"))
}

// ── Time formatting helpers ───────────────────────────────────────────────────

fn micros_to_date(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d")
        .to_string()
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// wot — authenticate OpenPGP certificate bindings using the web of trust.
#[derive(Parser, Debug)]
#[command(
    name = "wot",
    about = "OpenPGP web of trust",
    version,
    long_about = "wot — OpenPGP web of trust\n\nAuthenticate bindings between certificates and user IDs by\nfinding certification paths from trust roots."
)]
struct Cli {
    /// Keyring directory (default: ~/.openpgp-wot/keyring)
    #[arg(long, global = true)]
    keyring: Option<PathBuf>,

    /// Reference time as RFC 3339 (default: now)
    #[arg(long, global = true)]
    time: Option<String>,

    /// Trust root as FINGERPRINT or FINGERPRINT:AMOUNT (repeatable)
    #[arg(short = 'r', long = "trust-root", global = true)]
    trust_roots: Vec<String>,

    /// Treat every certification as an unconstrained introducer
    #[arg(long, global = true)]
    certification_network: bool,

    /// Required trust amount
    #[arg(short = 'a', long, global = true, conflicts_with = "level")]
    amount: Option<u32>,

    /// Required authentication level
    #[arg(long, global = true, value_enum)]
    level: Option<Level>,

    /// Also show bindings that are only partially authenticated
    #[arg(long, global = true)]
    partial: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Level {
    Partially,
    Fully,
    Doubly,
}

impl From<Level> for AuthenticationLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Partially => AuthenticationLevel::Partially,
            Level::Fully => AuthenticationLevel::Fully,
            Level::Doubly => AuthenticationLevel::Doubly,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate a binding between a certificate and a user ID
    Authenticate {
        /// Certificate fingerprint
        fingerprint: String,
        /// User ID
        user_id: String,
    },

    /// List the authenticated user IDs of a certificate
    Identify {
        /// Certificate fingerprint
        fingerprint: String,
    },

    /// Find certificates authenticated for a user ID
    Lookup {
        /// User ID, or e-mail address with --email
        user_id: String,

        /// Match user IDs containing <USER_ID>
        #[arg(long)]
        email: bool,
    },

    /// List all authenticated bindings
    List {
        /// Only show user IDs containing PATTERN (case-insensitive)
        pattern: Option<String>,
    },

    /// Check an explicit path: FINGERPRINT... USER_ID, root first
    Path {
        #[arg(required = true, num_args = 2..)]
        args: Vec<String>,
    },

    /// Import certificate files into the keyring
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Make a stored certificate the keyring's trust root
    SetTrustRoot {
        /// Certificate fingerprint
        fingerprint: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Authenticate {
            fingerprint,
            user_id,
        } => cmd_authenticate(&cli, fingerprint, user_id),
        Commands::Identify { fingerprint } => cmd_identify(&cli, fingerprint),
        Commands::Lookup { user_id, email } => cmd_lookup(&cli, user_id, *email),
        Commands::List { pattern } => cmd_list(&cli, pattern.as_deref()),
        Commands::Path { args } => cmd_path(&cli, args),
        Commands::Import { files } => cmd_import(&cli, files),
        Commands::SetTrustRoot { fingerprint } => cmd_set_trust_root(&cli, fingerprint),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn open_store(cli: &Cli) -> Result<KeyringStore> {
    let dir = match &cli.keyring {
        Some(dir) => dir.clone(),
        None => default_keyring_dir()?,
    };
    KeyringStore::new(&dir).with_context(|| format!("failed to open keyring {}", dir.display()))
}

fn reference_time(cli: &Cli) -> Result<ReferenceTime> {
    match &cli.time {
        Some(s) => rfc3339_to_micros(s)
            .map(ReferenceTime::at)
            .ok_or_else(|| anyhow!("invalid time '{s}' (expected RFC 3339)")),
        None => Ok(ReferenceTime::now()),
    }
}

fn parse_fingerprint(s: &str) -> Result<Fingerprint> {
    Fingerprint::new(s).with_context(|| format!("invalid fingerprint '{s}'"))
}

/// Parse `FINGERPRINT` or `FINGERPRINT:AMOUNT`.
fn parse_root(s: &str) -> Result<Root> {
    match s.split_once(':') {
        Some((fpr, amount)) => {
            let amount: u8 = amount
                .parse()
                .with_context(|| format!("invalid trust amount in '{s}'"))?;
            Ok(Root::new(parse_fingerprint(fpr)?, amount))
        }
        None => Ok(Root::full(parse_fingerprint(s)?)),
    }
}

fn query_config(cli: &Cli) -> QueryConfig {
    let mut config = QueryConfig::default().with_partial(cli.partial);
    if let Some(level) = cli.level {
        config = config.with_level(level.into());
    }
    if let Some(amount) = cli.amount {
        config = config.with_threshold(amount);
    }
    if cli.certification_network {
        config = config.with_mode(NetworkMode::Certification);
    }
    config
}

fn open_authority(cli: &Cli) -> Result<CertificateAuthority> {
    let store = open_store(cli)?;
    let at = reference_time(cli)?;

    let mut roots = Roots::default();
    for s in &cli.trust_roots {
        roots.add(parse_root(s)?);
    }
    match store.trust_root().context("failed to read trust root")? {
        Some(root) => roots.add(Root::full(root.fingerprint)),
        None => log::debug!("no trust root in {}", store.base_dir().display()),
    }
    if roots.is_empty() {
        bail!("no trust roots: pass --trust-root or run `wot set-trust-root`");
    }

    let certificates = store.certificates().context("failed to read keyring")?;
    let network = NetworkBuilder::new(Ed25519Verifier::new(), at).build(&certificates);

    if cli.verbose {
        eprintln!(
            "Network at {}: {} certificates, {} certification sets, {} signatures",
            micros_to_rfc3339(at.timestamp()),
            network.number_of_nodes(),
            network.number_of_edges(),
            network.number_of_signatures()
        );
        eprintln!("Roots: {roots}");
    }

    Ok(CertificateAuthority::new(network, roots).with_config(query_config(cli)))
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct BindingReport<'a> {
    fingerprint: &'a Fingerprint,
    user_id: &'a str,
    amount: u32,
    percentage: u32,
    authenticated: bool,
    paths: Vec<PathReport>,
}

#[derive(Serialize)]
struct PathReport {
    amount: u8,
    certificates: Vec<Fingerprint>,
}

fn report<'a>(binding: &'a Binding, threshold: u32) -> BindingReport<'a> {
    BindingReport {
        fingerprint: &binding.fingerprint,
        user_id: &binding.user_id,
        amount: binding.amount(),
        percentage: binding.percentage(threshold),
        authenticated: binding.amount() >= threshold,
        paths: binding
            .paths
            .iter()
            .map(|item| PathReport {
                amount: item.amount(),
                certificates: item
                    .path()
                    .certificates()
                    .map(|c| c.fingerprint().clone())
                    .collect(),
            })
            .collect(),
    }
}

fn describe(certification: &Certification) -> String {
    let what = match certification.user_id() {
        Some(user_id) => format!("certified {user_id:?}"),
        None => "delegated to".to_string(),
    };
    let amount = certification.trust_amount();
    let role = if certification.trust_depth().value() == Some(0) {
        String::new()
    } else if amount >= FULLY_TRUSTED {
        format!(", fully trusted introducer (depth {})", certification.trust_depth())
    } else {
        format!(
            ", partially trusted ({amount} of {FULLY_TRUSTED}) introducer (depth {})",
            certification.trust_depth()
        )
    };
    let scope = if certification.regexes().is_wildcard() {
        String::new()
    } else {
        format!(
            ", scoped to {}",
            certification
                .regexes()
                .expressions()
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };
    format!(
        "{what} on {}{role}{scope}",
        micros_to_date(certification.creation_time())
    )
}

fn print_path(path: &Path, index: usize, count: usize, amount: u8) {
    println!("  Path #{} of {count}, trust amount {amount}:", index + 1);
    println!("    ◯ {}", path.root().fingerprint());
    let certifications = path.certifications();
    for (i, certification) in certifications.iter().enumerate() {
        let last = i + 1 == certifications.len();
        println!("    │   {}", describe(certification));
        let target = certification.target().fingerprint();
        match (last, certification.user_id()) {
            (true, Some(user_id)) => println!("    └ {target} {user_id:?}"),
            (true, None) => println!("    └ {target}"),
            (false, _) => println!("    ├ {target}"),
        }
    }
}

/// Print bindings; return whether any is fully authenticated.
fn print_bindings(cli: &Cli, authority: &CertificateAuthority, bindings: &[Binding]) -> Result<bool> {
    let threshold = authority.config().threshold;
    let shown: Vec<&Binding> = bindings
        .iter()
        .filter(|b| cli.partial || b.amount() >= threshold)
        .collect();

    if cli.json {
        let reports: Vec<_> = shown.iter().map(|b| report(b, threshold)).collect();
        let json = serde_json::to_string_pretty(&reports).context("failed to serialize results")?;
        println!("{json}");
    } else if shown.is_empty() {
        println!("No authenticated bindings found.");
    } else {
        for binding in &shown {
            let authenticated = binding.amount() >= threshold;
            println!(
                "[{}] {} {:?}: {} ({}%)",
                if authenticated { "✓" } else { " " },
                binding.fingerprint,
                binding.user_id,
                if authenticated {
                    "authenticated"
                } else {
                    "partially authenticated"
                },
                binding.percentage(threshold)
            );
            if cli.verbose || !authenticated {
                let count = binding.paths.len();
                for (i, item) in binding.paths.iter().enumerate() {
                    print_path(item.path(), i, count, item.amount());
                }
            }
            println!();
        }
    }

    Ok(shown.iter().any(|b| b.amount() >= threshold))
}

// ── Command implementations ───────────────────────────────────────────────────

/// `wot authenticate FINGERPRINT USER_ID`
fn cmd_authenticate(cli: &Cli, fingerprint: &str, user_id: &str) -> Result<bool> {
    let fingerprint = parse_fingerprint(fingerprint)?;
    let authority = open_authority(cli)?;

    let binding = authority.authenticate(&fingerprint, user_id);
    if cli.verbose {
        let decision = authority.decide(&binding);
        eprintln!("{fingerprint} {user_id:?}: {decision}");
    }

    let bindings = if binding.paths.is_empty() {
        Vec::new()
    } else {
        vec![binding]
    };
    print_bindings(cli, &authority, &bindings)
}

/// `wot identify FINGERPRINT`
fn cmd_identify(cli: &Cli, fingerprint: &str) -> Result<bool> {
    let fingerprint = parse_fingerprint(fingerprint)?;
    let authority = open_authority(cli)?;
    if !authority.network().contains(&fingerprint) {
        bail!("certificate {fingerprint} is not in the keyring or is not usable");
    }
    print_bindings(cli, &authority, &authority.identify(&fingerprint))
}

/// `wot lookup [--email] USER_ID`
fn cmd_lookup(cli: &Cli, user_id: &str, email: bool) -> Result<bool> {
    let authority = open_authority(cli)?;
    print_bindings(cli, &authority, &authority.lookup(user_id, email))
}

/// `wot list [PATTERN]`
fn cmd_list(cli: &Cli, pattern: Option<&str>) -> Result<bool> {
    let authority = open_authority(cli)?;
    print_bindings(cli, &authority, &authority.list(pattern))
}

/// `wot path FINGERPRINT... USER_ID`
fn cmd_path(cli: &Cli, args: &[String]) -> Result<bool> {
    let (user_id, chain) = args
        .split_last()
        .ok_or_else(|| anyhow!("expected FINGERPRINT... USER_ID"))?;
    let chain = chain
        .iter()
        .map(|s| parse_fingerprint(s))
        .collect::<Result<Vec<_>>>()?;

    let authority = open_authority(cli)?;
    let binding = authority
        .check_path(&chain, user_id)
        .context("path is not valid")?;

    let threshold = authority.config().threshold;
    if cli.json {
        let json = serde_json::to_string_pretty(&report(&binding, threshold))
            .context("failed to serialize result")?;
        println!("{json}");
    } else {
        for (i, item) in binding.paths.iter().enumerate() {
            print_path(item.path(), i, binding.paths.len(), item.amount());
        }
        println!(
            "Path is valid; it authenticates {:?} to {}% ({} of {threshold}).",
            binding.user_id,
            binding.percentage(threshold),
            binding.amount()
        );
    }
    Ok(binding.amount() >= threshold)
}

/// `wot import FILE...`
fn cmd_import(cli: &Cli, files: &[PathBuf]) -> Result<bool> {
    let store = open_store(cli)?;
    for file in files {
        let fingerprint = store
            .import_file(file)
            .with_context(|| format!("failed to import {}", file.display()))?;
        println!("Imported {fingerprint} from {}", file.display());
    }
    Ok(true)
}

/// `wot set-trust-root FINGERPRINT`
fn cmd_set_trust_root(cli: &Cli, fingerprint: &str) -> Result<bool> {
    let fingerprint = parse_fingerprint(fingerprint)?;
    let store = open_store(cli)?;
    let certificate = store
        .load(&fingerprint)
        .with_context(|| format!("failed to load certificate {fingerprint}"))?;
    store
        .set_trust_root(&certificate)
        .context("failed to write trust root")?;
    println!("Trust root set to {fingerprint}");
    Ok(true)
}
