use clap::Parser;
use miette::Result;
use tps::cli::{Cli, Commands};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => tps::cli::commands::init::run(args),
        Commands::Resolve(args) => tps::cli::commands::resolve::run(args, &global),
        Commands::Rollup(args) => tps::cli::commands::rollup::run(args, &global),
        Commands::Baseline(cmd) => tps::cli::commands::baseline::run(cmd, &global),
    }
}

/// Logs go to stderr; `TPS_LOG` overrides the filter (e.g. `TPS_LOG=tps=trace`)
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TPS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "tps=debug,warn" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
