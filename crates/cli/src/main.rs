use clap::{Parser, Subcommand};
use dnscache_application::LookupContext;
use dnscache_domain::{CliOverrides, DialStrategy, IpFamily};
use dnscache_infrastructure::dns::CachingResolver;
use output::{DialOutput, LookupOutput, Printer};
use std::time::{Duration, Instant};
use tracing::info;

mod bootstrap;
mod di;
mod output;

#[derive(Parser)]
#[command(name = "dnscache")]
#[command(version)]
#[command(about = "Caching DNS resolver and failover TCP dialer")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Fixed upstream resolver (ip or ip:port)
    #[arg(short = 'e', long, global = true)]
    endpoint: Option<String>,

    /// Dial strategy (sequential, round_robin, random)
    #[arg(short = 's', long, global = true)]
    strategy: Option<DialStrategy>,

    /// Bypass the cache
    #[arg(long, global = true)]
    disabled: bool,

    /// Per-operation timeout in milliseconds
    #[arg(short = 't', long, global = true)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Print cache counters before exiting
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a host name to addresses
    Lookup {
        host: String,

        /// Resolve this many times through the cache
        #[arg(short = 'n', long, default_value_t = 1)]
        repeat: u32,
    },
    /// Resolve an address to host names
    Reverse { addr: String },
    /// Resolve a host name to addresses of one family
    Ip {
        host: String,

        /// ip, ip4 or ip6
        #[arg(short = 'f', long, default_value = "ip")]
        family: IpFamily,
    },
    /// Open a TCP connection to host:port
    Dial { address: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        resolver_endpoint: cli.endpoint.clone(),
        dial_strategy: cli.strategy,
        disabled: cli.disabled.then_some(true),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        disabled = config.resolver.disabled,
        endpoint = config.resolver.resolver_endpoint.as_deref().unwrap_or("system"),
        "Starting dnscache"
    );

    let resolver = di::build_resolver(&config)?;
    let printer = Printer::new(cli.json);
    let timeout = cli.timeout_ms.map(Duration::from_millis);

    let result = run(&cli.command, &resolver, &printer, timeout).await;

    if cli.stats {
        printer.stats(resolver.stats())?;
    }
    resolver.stop();
    result
}

fn context(timeout: Option<Duration>) -> LookupContext {
    match timeout {
        Some(timeout) => LookupContext::with_timeout(timeout),
        None => LookupContext::background(),
    }
}

async fn run(
    command: &Command,
    resolver: &CachingResolver,
    printer: &Printer,
    timeout: Option<Duration>,
) -> anyhow::Result<()> {
    match command {
        Command::Lookup { host, repeat } => {
            for _ in 0..(*repeat).max(1) {
                let start = Instant::now();
                let answers = resolver.lookup_host(&context(timeout), host).await?;
                printer.lookup(&LookupOutput {
                    query: host,
                    kind: "host",
                    answers,
                    elapsed_us: start.elapsed().as_micros() as u64,
                })?;
            }
        }
        Command::Reverse { addr } => {
            let start = Instant::now();
            let answers = resolver.lookup_addr(&context(timeout), addr).await?;
            printer.lookup(&LookupOutput {
                query: addr,
                kind: "addr",
                answers,
                elapsed_us: start.elapsed().as_micros() as u64,
            })?;
        }
        Command::Ip { host, family } => {
            let start = Instant::now();
            let ips = resolver.lookup_ip(&context(timeout), *family, host).await?;
            printer.lookup(&LookupOutput {
                query: host,
                kind: family.as_str(),
                answers: output::render_ips(&ips),
                elapsed_us: start.elapsed().as_micros() as u64,
            })?;
        }
        Command::Dial { address } => {
            let start = Instant::now();
            let stream = resolver.dial(&context(timeout), address).await?;
            printer.dial(&DialOutput {
                address,
                local: stream.local_addr()?.to_string(),
                peer: stream.peer_addr()?.to_string(),
                elapsed_us: start.elapsed().as_micros() as u64,
            })?;
        }
    }
    Ok(())
}
