use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "visa-crm", version, about = "Immigration and visa case management backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API, client portal and background tasks
    Serve,
    /// Notify clients on open cases with no update beyond the SLA
    CheckSla {
        /// SLA days without update
        #[arg(long)]
        days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => visa_crm::bootstrapper::run().await,
        Command::CheckSla { days } => {
            let report = visa_crm::bootstrapper::check_sla(days).await?;
            println!("{}", report.summary());
            println!("SLA check completed.");
            Ok(())
        }
    }
}
