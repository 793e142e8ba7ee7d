use clap::Parser;
use havenvault::cli::{Cli, Commands, ContactAction};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => havenvault::cli::commands::init::execute(&cli),
        Commands::Put { ref kind, ref value } => {
            havenvault::cli::commands::put::execute(&cli, kind, value)
        }
        Commands::Get { ref id } => havenvault::cli::commands::get::execute(&cli, id),
        Commands::List => havenvault::cli::commands::list::execute(&cli),
        Commands::Contact { ref action } => match action {
            ContactAction::Set { ref name, ref handle } => {
                havenvault::cli::commands::contact::execute_set(&cli, name, handle)
            }
            ContactAction::Show => havenvault::cli::commands::contact::execute_show(&cli),
        },
        Commands::Log { last } => havenvault::cli::commands::log_cmd::execute(&cli, last),
        Commands::Verify => havenvault::cli::commands::verify::execute(&cli),
        Commands::SetPasscode => havenvault::cli::commands::passcode::execute(&cli),
        Commands::Export { ref output } => {
            havenvault::cli::commands::export::execute(&cli, output.as_deref())
        }
        Commands::Import {
            ref file,
            ref device_secret,
        } => havenvault::cli::commands::import_cmd::execute(&cli, file, device_secret.as_deref()),
        Commands::Destroy { force } => havenvault::cli::commands::destroy::execute(&cli, force),
        Commands::Completions { ref shell } => {
            havenvault::cli::commands::completions::execute(shell)
        }
    };

    if let Err(e) = result {
        havenvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
