use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use daraja::config::consts::DEFAULT_CONFIG_PATH;
use daraja::models::{
    B2BPayment, B2CPayment, BalanceInquiry, C2BRegisterUrl, C2BSimulation, CommandId,
    IdentifierType, PullTransactions, ResponseType, Reversal, StkPush, StkPushQuery,
};
use daraja::{
    ClientConfig, ConfigLayer, Daraja, Environment, GatewayResponse, load_config_layer_from_path,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// CLI arguments for the gateway client
#[derive(Parser, Debug)]
#[command(name = "daraja")]
#[command(about = "Daraja - call the M-Pesa gateway from the command line", long_about = None)]
struct CliArgs {
    /// Application consumer key
    #[arg(long, env = "DARAJA_APP_KEY", global = true)]
    app_key: Option<String>,

    /// Application consumer secret
    #[arg(long, env = "DARAJA_APP_SECRET", global = true, hide_env_values = true)]
    app_secret: Option<String>,

    /// Gateway environment
    #[arg(long, env = "DARAJA_ENVIRONMENT", value_enum, global = true)]
    environment: Option<Environment>,

    /// TOML config file (app_key, app_secret, environment, timeout_secs, base_url)
    #[arg(long, env = "DARAJA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the environment's base URL
    #[arg(long, env = "DARAJA_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch an access token
    Token,
    /// Derive the STK password for a shortcode, passkey and timestamp
    Password {
        #[arg(long)]
        shortcode: String,
        #[arg(long, env = "DARAJA_PASSKEY", hide_env_values = true)]
        passkey: String,
        /// Defaults to the current gateway time
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Encrypt an initiator password into a security credential
    Credential {
        #[arg(long, env = "DARAJA_INITIATOR_PASSWORD", hide_env_values = true)]
        initiator_password: String,
        /// Local certificate; downloaded for the environment when omitted
        #[arg(long)]
        certificate: Option<PathBuf>,
    },
    /// Send a payment prompt to a customer's handset
    StkPush {
        #[arg(long)]
        shortcode: String,
        #[arg(long, env = "DARAJA_PASSKEY", hide_env_values = true)]
        passkey: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        callback_url: String,
        #[arg(long)]
        reference: String,
        #[arg(long, default_value = "Payment")]
        description: String,
    },
    /// Query the status of a payment prompt
    StkQuery {
        #[arg(long)]
        shortcode: String,
        #[arg(long, env = "DARAJA_PASSKEY", hide_env_values = true)]
        passkey: String,
        #[arg(long)]
        checkout_request_id: String,
    },
    /// Register C2B confirmation and validation URLs
    RegisterUrl {
        #[arg(long)]
        shortcode: String,
        #[arg(long)]
        confirmation_url: String,
        #[arg(long)]
        validation_url: String,
        /// Cancel payments when the validation URL is unreachable
        #[arg(long)]
        cancel_on_timeout: bool,
    },
    /// Simulate a C2B customer payment
    Simulate {
        #[arg(long)]
        shortcode: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        msisdn: String,
        #[arg(long, default_value = "")]
        bill_ref_number: String,
        /// Till (buy goods) instead of paybill
        #[arg(long)]
        buy_goods: bool,
    },
    /// Pay a customer from a business shortcode
    B2c {
        #[command(flatten)]
        initiator: InitiatorArgs,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        party_a: String,
        #[arg(long)]
        party_b: String,
        #[arg(long, default_value = "")]
        occasion: String,
    },
    /// Pay another business
    B2b {
        #[command(flatten)]
        initiator: InitiatorArgs,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        party_a: String,
        #[arg(long)]
        party_b: String,
        #[arg(long)]
        account_reference: String,
    },
    /// Reverse a completed transaction
    Reversal {
        #[command(flatten)]
        initiator: InitiatorArgs,
        #[arg(long)]
        transaction_id: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        receiver_party: String,
        #[arg(long, default_value = "")]
        occasion: String,
    },
    /// Query a shortcode's account balance
    Balance {
        #[command(flatten)]
        initiator: InitiatorArgs,
        #[arg(long)]
        party_a: String,
    },
    /// Pull transactions for a shortcode over a date range
    Pull {
        #[arg(long)]
        shortcode: String,
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        end_date: String,
        #[arg(long, default_value = "1")]
        page_number: String,
    },
}

/// Arguments shared by the initiator-authenticated operations
#[derive(Args, Debug)]
struct InitiatorArgs {
    #[arg(long)]
    initiator: String,
    /// Pre-computed security credential
    #[arg(long, env = "DARAJA_SECURITY_CREDENTIAL", hide_env_values = true)]
    security_credential: String,
    #[arg(long)]
    queue_timeout_url: String,
    #[arg(long)]
    result_url: String,
    #[arg(long, default_value = "OK")]
    remarks: String,
}

/// Resolve client configuration with priority: CLI/env -> config file -> defaults
fn resolve_config(args: &CliArgs) -> Result<ClientConfig> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let file = if path.exists() {
        load_config_layer_from_path(&path)
            .with_context(|| format!("Loading {}", path.display()))?
    } else {
        ConfigLayer::default()
    };

    let cli = ConfigLayer {
        app_key: args.app_key.clone(),
        app_secret: args.app_secret.clone(),
        environment: args.environment,
        timeout: None,
        base_url: args.base_url.clone(),
    };
    cli.or(file).into_client_config().context(
        "app key and secret are required (--app-key/--app-secret, \
         DARAJA_APP_KEY/DARAJA_APP_SECRET or config file)",
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(response: &GatewayResponse) -> Result<()> {
    if !response.is_accepted() {
        tracing::warn!(code = ?response.response_code, "Gateway did not accept the request");
    }
    print_json(response)
}

fn read_certificate(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Reading certificate {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::ERROR.into())
        .from_env_lossy()
        .add_directive("daraja=info".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = CliArgs::parse();

    // Commands that never talk to the gateway
    match &args.command {
        Command::Password {
            shortcode,
            passkey,
            timestamp,
        } => {
            let timestamp = timestamp.clone().unwrap_or_else(daraja::timestamp_now);
            println!("{}", daraja::derive_password(shortcode, passkey, &timestamp));
            return Ok(());
        }
        Command::Credential {
            initiator_password,
            certificate: Some(path),
        } => {
            let certificate = read_certificate(path)?;
            println!(
                "{}",
                daraja::encrypt_initiator_secret(initiator_password, &certificate)?
            );
            return Ok(());
        }
        _ => {}
    }

    let config = resolve_config(&args)?;
    info!(environment = %config.environment, base_url = config.base_url(), "Using gateway");
    let client = Daraja::new(config).context("Building gateway client")?;

    match args.command {
        Command::Token => {
            let token = client.access_token().await?;
            println!("{}", token.access_token);
            info!(expires_in = token.expires_in, "Access token issued");
        }
        Command::Password { .. } => {}
        Command::Credential {
            initiator_password, ..
        } => {
            println!("{}", client.security_credential(&initiator_password).await?);
        }
        Command::StkPush {
            shortcode,
            passkey,
            amount,
            phone,
            callback_url,
            reference,
            description,
        } => {
            let request = StkPush::new(
                &shortcode,
                amount,
                &phone,
                &callback_url,
                &reference,
                &description,
                &passkey,
            );
            print_response(&client.stk_push(&request).await?)?;
        }
        Command::StkQuery {
            shortcode,
            passkey,
            checkout_request_id,
        } => {
            let request = StkPushQuery::new(&shortcode, &passkey, &checkout_request_id);
            print_response(&client.stk_push_query(&request).await?)?;
        }
        Command::RegisterUrl {
            shortcode,
            confirmation_url,
            validation_url,
            cancel_on_timeout,
        } => {
            let request = C2BRegisterUrl {
                short_code: shortcode,
                response_type: if cancel_on_timeout {
                    ResponseType::Cancelled
                } else {
                    ResponseType::Completed
                },
                confirmation_url,
                validation_url,
            };
            print_response(&client.c2b_register_url(&request).await?)?;
        }
        Command::Simulate {
            shortcode,
            amount,
            msisdn,
            bill_ref_number,
            buy_goods,
        } => {
            let request = C2BSimulation {
                short_code: shortcode,
                command_id: if buy_goods {
                    CommandId::CustomerBuyGoodsOnline
                } else {
                    CommandId::CustomerPayBillOnline
                },
                amount,
                msisdn,
                bill_ref_number,
            };
            print_response(&client.c2b_simulate(&request).await?)?;
        }
        Command::B2c {
            initiator,
            amount,
            party_a,
            party_b,
            occasion,
        } => {
            let request = B2CPayment {
                initiator_name: initiator.initiator,
                security_credential: initiator.security_credential,
                command_id: CommandId::BusinessPayment,
                amount,
                party_a,
                party_b,
                remarks: initiator.remarks,
                queue_timeout_url: initiator.queue_timeout_url,
                result_url: initiator.result_url,
                occasion,
            };
            print_response(&client.b2c_payment(&request).await?)?;
        }
        Command::B2b {
            initiator,
            amount,
            party_a,
            party_b,
            account_reference,
        } => {
            let request = B2BPayment {
                initiator: initiator.initiator,
                security_credential: initiator.security_credential,
                command_id: CommandId::BusinessPayBill,
                sender_identifier_type: IdentifierType::Shortcode,
                receiver_identifier_type: IdentifierType::Shortcode,
                amount,
                party_a,
                party_b,
                remarks: initiator.remarks,
                account_reference,
                queue_timeout_url: initiator.queue_timeout_url,
                result_url: initiator.result_url,
            };
            print_response(&client.b2b_payment(&request).await?)?;
        }
        Command::Reversal {
            initiator,
            transaction_id,
            amount,
            receiver_party,
            occasion,
        } => {
            let request = Reversal {
                initiator: initiator.initiator,
                security_credential: initiator.security_credential,
                command_id: CommandId::TransactionReversal,
                transaction_id,
                amount,
                receiver_party,
                receiver_identifier_type: IdentifierType::Shortcode,
                queue_timeout_url: initiator.queue_timeout_url,
                result_url: initiator.result_url,
                remarks: initiator.remarks,
                occasion,
            };
            print_response(&client.reversal(&request).await?)?;
        }
        Command::Balance { initiator, party_a } => {
            let request = BalanceInquiry {
                initiator: initiator.initiator,
                security_credential: initiator.security_credential,
                command_id: CommandId::AccountBalance,
                party_a,
                identifier_type: IdentifierType::Shortcode,
                remarks: initiator.remarks,
                queue_timeout_url: initiator.queue_timeout_url,
                result_url: initiator.result_url,
            };
            print_response(&client.account_balance(&request).await?)?;
        }
        Command::Pull {
            shortcode,
            start_date,
            end_date,
            page_number,
        } => {
            let request = PullTransactions {
                short_code: shortcode,
                start_date,
                end_date,
                page_number,
            };
            print_response(&client.pull_transactions(&request).await?)?;
        }
    }

    Ok(())
}
