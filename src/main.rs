use std::cmp::Ordering;
use std::env;
use std::io;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use pip_search::{search, Config, GithubAuth, Package, SearchOptions};

#[derive(Parser)]
#[command(name = "pip-search")]
#[command(about = "Search PyPI packages from your terminal", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// What to search for
    query: Option<String>,

    /// Sort results (defaults to name)
    #[arg(short, long, value_enum, value_name = "KEY")]
    sort: Option<SortKey>,

    /// Look up GitHub stars/forks/watchers for each result (slower;
    /// reads GITHUB_USERNAME and GITHUBAPITOKEN for API credentials)
    #[arg(long)]
    extra: bool,

    /// Emit verbose diagnostics on stderr
    #[arg(long)]
    debug: bool,

    /// strftime format for released dates
    #[arg(long, value_name = "FMT")]
    date_format: Option<String>,

    /// Number of result pages to fetch
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Generate shell completion script and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<Shell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    Name,
    Version,
    Released,
}

fn init_tracing(debug: bool) {
    let default = if debug { "pip_search=debug" } else { "pip_search=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn github_auth() -> Option<GithubAuth> {
    let username = env::var("GITHUB_USERNAME").ok()?;
    let token = env::var("GITHUBAPITOKEN").ok()?;
    Some(GithubAuth { username, token })
}

fn sort_packages(packages: &mut [Package], key: SortKey) {
    match key {
        SortKey::Name => packages.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Version => packages.sort_by(|a, b| compare_versions(&a.version, &b.version)),
        SortKey::Released => packages.sort_by(|a, b| a.released_date.cmp(&b.released_date)),
    }
}

/// Dotted-version compare: segment by segment, numerically where both
/// segments are numbers (so 1.10 sorts after 1.9), string order
/// otherwise. Good enough for display; this is not a full PEP 440
/// ordering.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn print_package(package: &Package, date_format: &str) {
    println!("  {} ({})", package.name, package.version);
    println!("    Released: {}", package.released_date_str(Some(date_format)));
    if !package.description.is_empty() {
        println!("    {}", package.description);
    }
    println!("    {}", package.link);
    if package.info_set {
        println!(
            "    ⭐ Stars: {} | 🍴 Forks: {} | 👀 Watchers: {}",
            package.stars, package.forks, package.watchers
        );
        println!("    {}", package.github_link);
    }
    println!();
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "pip-search", &mut io::stdout());
        return;
    }

    let query = match cli.query {
        Some(query) => query,
        None => {
            let mut cmd = Cli::command();
            let _ = cmd.print_help();
            println!();
            return;
        }
    };

    init_tracing(cli.debug);

    let mut config = Config::default();
    if let Some(pages) = cli.pages {
        config.pages = pages;
    }
    if let Some(format) = cli.date_format {
        config.date_format = format;
    }
    let sort = cli
        .sort
        .unwrap_or_else(|| SortKey::from_str(&config.sort_by, true).unwrap_or(SortKey::Name));

    let opts = SearchOptions {
        debug: cli.debug,
        extra: cli.extra,
        auth: if cli.extra { github_auth() } else { None },
    };

    let results = match search(&query, &config, &opts) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut packages = Vec::new();
    for package in results {
        match package {
            Ok(package) => packages.push(package),
            Err(e) => {
                eprintln!("Search failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if packages.is_empty() {
        println!("No packages found for '{}'.", query);
        return;
    }

    sort_packages(&mut packages, sort);

    println!("\nFound {} packages for '{}':\n", packages.len(), query);
    for package in &packages {
        print_package(package, &config.date_format);
    }
}
