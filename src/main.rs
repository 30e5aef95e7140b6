use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use unsealer::cli::{Cli, Commands, OutputFormat};
use unsealer::commands::{self, SessionEvent};
use unsealer::prompt;
use unsealer::session::SessionStore;

/// Logs go to stderr so status output on stdout stays machine-readable
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads the next share for an interactive session, warning once if the
/// input channel echoes
fn next_share(warned: &mut bool) -> Result<Option<Zeroizing<String>>> {
    let Some(entry) = prompt::read_share()? else {
        return Ok(None);
    };
    if !entry.is_echo_safe() && !*warned {
        eprintln!("{}", prompt::ECHO_WARNING);
        *warned = true;
    }
    Ok(Some(entry.into_value()))
}

fn print_event(event: &SessionEvent<'_>, format: OutputFormat) {
    match event {
        SessionEvent::Status(response) => match commands::render(response, format) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("{e:#}"),
        },
        SessionEvent::Rejected(err) => eprintln!("Error attempting unseal: {err}"),
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Unseal {
            config,
            reset,
            format,
            keys,
        } => {
            let (coordinator, _key_slot) = commands::open_coordinator(&config)?;

            if !keys.is_empty() {
                eprintln!(
                    "WARNING: shares passed as arguments may be kept in your shell history."
                );
            }
            let keys: Vec<Zeroizing<String>> = keys.into_iter().map(Zeroizing::new).collect();

            let mut warned = false;
            commands::unseal_session(
                &coordinator,
                reset,
                &keys,
                || next_share(&mut warned),
                |event| print_event(event, format),
            )?;
        }
        Commands::Config { config, format } => {
            println!("{}", commands::describe(&config, format)?);
        }
        Commands::Token {
            session,
            root,
            action,
        } => {
            let store = SessionStore::new(root);
            if let Some(token) = commands::token(&store, &session, action, &mut io::stdin().lock())?
            {
                println!("{}", token.as_str());
            }
        }
    }

    Ok(())
}
