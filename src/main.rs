use anyhow::Result;
use clap::{Parser, Subcommand};

use booking_intake::email::{EmailService, OutboundMessage};

/// booking-intake - booking form relay
#[derive(Parser)]
#[command(name = "booking-intake")]
#[command(about = "Relay booking form submissions as email notifications", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send a probe email through the configured transport
    TestEmail {
        /// Recipient, defaults to the admin notification address
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = booking_intake::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    booking_intake::observability::init_logging(
        "booking-intake",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::TestEmail { to } => test_email_command(config, to).await,
    }
}

async fn serve_command(
    config: booking_intake::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting booking-intake server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or_else(|| config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    booking_intake::server::serve(config, host, port).await
}

async fn test_email_command(config: booking_intake::Config, to: Option<String>) -> Result<()> {
    let recipient = to.unwrap_or_else(|| config.mail.admin_email.clone());
    let email = EmailService::new(&config.mail)?;

    let message = OutboundMessage {
        to: recipient.clone(),
        reply_to: None,
        subject: "booking-intake test message".to_string(),
        html: "<p>The booking intake mail transport is working.</p>".to_string(),
        text: "The booking intake mail transport is working.".to_string(),
        attachments: Vec::new(),
    };
    email.send(&message).await?;

    tracing::info!(to = %recipient, "Test email sent");
    Ok(())
}
