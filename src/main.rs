use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use paygate::application::registry::PaymentRegistry;
use paygate::domain::authcode;
use paygate::domain::callback::CallbackEndpoint;
use paygate::domain::payment::{Environment, OrderId};
use paygate::infrastructure::config::LayeredConfig;
use paygate::infrastructure::in_memory::InMemoryPendingStore;
use paygate::interfaces::csv::callback_reader::CallbackReader;
use paygate::interfaces::csv::outcome_writer::{OutcomeRecord, OutcomeWriter};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a payment and print the gateway form fields as JSON
    Form {
        /// JSON file with the payment_* URL keys. PAYGATE_* variables override it.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Route through the real gateway instead of the demo one
        #[arg(long)]
        real: bool,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        merchant: String,
        #[arg(long)]
        secret: String,
    },
    /// Print the authcode the gateway would send with a callback
    Sign {
        #[arg(long)]
        secret: String,
        #[arg(long)]
        return_code: String,
        #[arg(long)]
        order_number: String,
        #[arg(long)]
        settled: Option<String>,
        #[arg(long)]
        incident_id: Option<String>,
    },
    /// Verify a CSV of recorded callbacks and print each outcome
    Verify {
        /// Input callbacks CSV file
        input: PathBuf,
        #[arg(long)]
        secret: String,
        /// Gateway address the callbacks were posted to
        #[arg(long, value_enum, default_value_t = Endpoint::Success)]
        endpoint: Endpoint,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Endpoint {
    Success,
    Failure,
}

impl From<Endpoint> for CallbackEndpoint {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Success => CallbackEndpoint::Success,
            Endpoint::Failure => CallbackEndpoint::Failure,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Form {
            config,
            real,
            amount,
            merchant,
            secret,
        } => {
            let source = LayeredConfig::load(config.as_deref()).into_diagnostic()?;

            let registry =
                PaymentRegistry::from_source(&source, Box::new(InMemoryPendingStore::new()))
                    .into_diagnostic()?;
            let form = registry
                .create_payment(
                    Environment::from_real_flag(real),
                    amount,
                    &merchant,
                    &secret,
                    |_| {},
                )
                .await
                .into_diagnostic()?;
            let url = registry
                .payment_url(&OrderId::from(form.order_number.as_str()))
                .await
                .into_diagnostic()?;

            let output = serde_json::json!({ "url": url, "fields": form });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).into_diagnostic()?
            );
        }
        Command::Sign {
            secret,
            return_code,
            order_number,
            settled,
            incident_id,
        } => {
            let code = authcode::inbound(
                &secret,
                &return_code,
                &order_number,
                settled.as_deref(),
                incident_id.as_deref(),
            );
            println!("{code}");
        }
        Command::Verify {
            input,
            secret,
            endpoint,
        } => {
            let endpoint = CallbackEndpoint::from(endpoint);
            let file = File::open(input).into_diagnostic()?;
            let reader = CallbackReader::new(file);

            let stdout = io::stdout();
            let mut writer = OutcomeWriter::new(stdout.lock());
            for callback in reader.callbacks() {
                match callback {
                    Ok(payload) => {
                        let code_matches = authcode::verify(&secret, &payload);
                        let outcome = endpoint.outcome(code_matches, &payload.return_code);
                        writer
                            .write(&OutcomeRecord {
                                order_number: &payload.order_number,
                                outcome: outcome.to_string(),
                            })
                            .into_diagnostic()?;
                    }
                    Err(e) => {
                        eprintln!("Error reading callback: {}", e);
                    }
                }
            }
            writer.flush().into_diagnostic()?;
        }
    }

    Ok(())
}
