use clap::Parser;
use miette::Result;
use secom::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, `secom-seed features | head` panics on a broken pipe.
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
    secom::core::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Features(args) => secom::cli::commands::features::run(args, &global),
        Commands::Init(args) => secom::cli::commands::init::run(args, &global),
        Commands::Load(args) => secom::cli::commands::load::run(args, &global),
        Commands::Summary(args) => secom::cli::commands::summary::run(args, &global),
    }
}
