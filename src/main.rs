//! CLI entry point for `squishmb`.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use squishmb::area::{AreaKind, MessageBase, SquishArea};
use squishmb::config::{self, Config};
use squishmb::model::NetAddr;

#[derive(Parser)]
#[command(name = "squishmb", version, about = "Read, list and post messages in Squish message bases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured areas
    Areas {
        #[arg(long)]
        json: bool,
    },
    /// List the messages in an area
    List {
        area: String,
        #[arg(long)]
        json: bool,
        /// Treat AREA as a file path prefix instead of a configured name
        #[arg(long, value_enum)]
        kind: Option<CliAreaKind>,
    },
    /// Show one message
    Show {
        area: String,
        /// 1-based message position
        position: u32,
        #[arg(long, value_enum)]
        kind: Option<CliAreaKind>,
    },
    /// Post a new message to an area
    Post {
        area: String,
        #[arg(long, default_value = "Sysop")]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        /// Message text; read from stdin when omitted
        #[arg(long)]
        body: Option<String>,
        /// Originating address, e.g. 2:5020/1042
        #[arg(long)]
        from_addr: Option<NetAddr>,
        /// Destination address (netmail areas only)
        #[arg(long)]
        to_addr: Option<NetAddr>,
        #[arg(long, value_enum)]
        kind: Option<CliAreaKind>,
    },
    /// Show or set the last-read position
    Last {
        area: String,
        /// New last-read position
        #[arg(long)]
        set: Option<u32>,
        #[arg(long, value_enum)]
        kind: Option<CliAreaKind>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliAreaKind {
    Local,
    Echo,
    Netmail,
}

impl From<CliAreaKind> for AreaKind {
    fn from(kind: CliAreaKind) -> Self {
        match kind {
            CliAreaKind::Local => AreaKind::Local,
            CliAreaKind::Echo => AreaKind::Echo,
            CliAreaKind::Netmail => AreaKind::Netmail,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &config);

    match cli.command {
        Commands::Areas { json } => cmd_areas(&config, json),
        Commands::List { area, json, kind } => {
            let mut area = open_area(&config, &area, kind)?;
            cmd_list(&mut area, json)
        }
        Commands::Show {
            area,
            position,
            kind,
        } => {
            let mut area = open_area(&config, &area, kind)?;
            cmd_show(&mut area, position)
        }
        Commands::Post {
            area,
            from,
            to,
            subject,
            body,
            from_addr,
            to_addr,
            kind,
        } => {
            let mut area = open_area(&config, &area, kind)?;
            cmd_post(&mut area, from, to, subject, body, from_addr, to_addr)
        }
        Commands::Last { area, set, kind } => {
            let mut area = open_area(&config, &area, kind)?;
            cmd_last(&mut area, set)
        }
    }
}

/// Set up tracing with stderr output and a log file next to the caches.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::log_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "squishmb.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Resolve an area argument: a configured name first, otherwise a file
/// path prefix (the triad extensions are appended to it).
fn open_area(config: &Config, name: &str, kind: Option<CliAreaKind>) -> anyhow::Result<SquishArea> {
    if let Some(area_cfg) = config.area(name) {
        return Ok(area_cfg.open(config));
    }
    // Not a configured name: accept a path prefix like /bbs/msgs/general.
    let path = PathBuf::from(name);
    if !name.contains(std::path::MAIN_SEPARATOR) && !name.contains('/') {
        anyhow::bail!("Area '{name}' is not configured (see `squishmb areas`)");
    }
    let kind = kind.map_or(AreaKind::Local, AreaKind::from);
    let area_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let mut area = SquishArea::new(area_name, path, kind);
    area.set_charset(config.general.charset.clone());
    Ok(area)
}

/// Print the configured areas.
fn cmd_areas(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.areas)?);
        return Ok(());
    }
    if config.areas.is_empty() {
        println!("  No areas configured.");
        return Ok(());
    }
    println!("  {:<20} {:<10} {}", "Name", "Kind", "Path");
    println!("  {}", "-".repeat(60));
    for area in &config.areas {
        println!(
            "  {:<20} {:<10} {}",
            area.name,
            format!("{:?}", area.kind).to_lowercase(),
            area.path.display()
        );
    }
    Ok(())
}

/// Print the message listing of an area.
fn cmd_list(area: &mut SquishArea, json: bool) -> anyhow::Result<()> {
    let last = area.last_read();
    let summaries = area.summaries().to_vec();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("  Area '{}' is empty.", area.name());
        return Ok(());
    }
    println!(
        "  {:<5} {:<16} {:<20} {:<20} {}",
        "#", "Date", "From", "To", "Subject"
    );
    println!("  {}", "-".repeat(90));
    for s in summaries {
        let marker = if s.msg_num == last { '*' } else { ' ' };
        let from: String = s.from.chars().take(19).collect();
        let to: String = s.to.chars().take(19).collect();
        let subject: String = s.subject.chars().take(30).collect();
        println!(
            "  {:<4}{} {:<16} {:<20} {:<20} {}",
            s.msg_num,
            marker,
            s.date_written.format("%Y-%m-%d %H:%M"),
            from,
            to,
            subject
        );
    }
    Ok(())
}

/// Print one full message.
fn cmd_show(area: &mut SquishArea, position: u32) -> anyhow::Result<()> {
    let msg = area.read_message(position)?;

    println!();
    println!("  From:    {} ({})", msg.from, msg.from_addr);
    if msg.to_addr.is_empty() {
        println!("  To:      {}", msg.to);
    } else {
        println!("  To:      {} ({})", msg.to, msg.to_addr);
    }
    println!("  Subject: {}", msg.subject);
    println!("  Date:    {}", msg.date_written.format("%d %b %y %H:%M:%S"));
    if !msg.attrs.is_empty() {
        println!("  Attrs:   {}", msg.attrs.join(" "));
    }
    if msg.corrupted {
        println!("  WARNING: index checksum mismatch, message may be damaged");
    }
    println!();
    println!("{}", msg.body);
    Ok(())
}

/// Post a new message.
fn cmd_post(
    area: &mut SquishArea,
    from: String,
    to: String,
    subject: String,
    body: Option<String>,
    from_addr: Option<NetAddr>,
    to_addr: Option<NetAddr>,
) -> anyhow::Result<()> {
    let body = match body {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let now = chrono::Local::now().naive_local();
    let mut msg = squishmb::model::Message {
        from,
        to,
        subject,
        body,
        from_addr: from_addr.unwrap_or_default(),
        to_addr: to_addr.unwrap_or_default(),
        date_written: now,
        date_arrived: now,
        ..squishmb::model::Message::default()
    };
    area.save_message(&mut msg)?;
    println!(
        "  Posted message {} to '{}'",
        area.count(),
        area.name()
    );
    Ok(())
}

/// Show or set the last-read position.
fn cmd_last(area: &mut SquishArea, set: Option<u32>) -> anyhow::Result<()> {
    if let Some(position) = set {
        let count = area.count();
        if position > count {
            anyhow::bail!("Position {position} out of range (area has {count} messages)");
        }
        area.set_last_read(position);
    }
    println!("{}", area.last_read());
    Ok(())
}
