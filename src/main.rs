use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;

use trustflow_client::api::types::{ProfileUpdate, RegisterRequest, UserUpdate};
use trustflow_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, KeychainTokenStore, LoginRedirect,
};

#[derive(Parser, Debug)]
#[command(name = "trustflow", about = "Command-line client for the TrustFlow API")]
struct Cli {
    /// Backend base URL (overrides TRUSTFLOW_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session token in the keychain
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        wallet_address: Option<String>,
    },
    /// Show the signed-in user
    Me,
    /// Update name or phone of the signed-in user
    UpdateUser {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Show the signed-in user's profile
    Profile,
    /// Update profile details
    UpdateProfile {
        #[arg(long)]
        date_of_birth: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        employment_status: Option<String>,
        #[arg(long)]
        monthly_income: Option<i64>,
    },
    /// Show the user together with their blockchain rating
    Rating,
    /// List credit transactions
    Transactions,
    /// Create a credit transaction from a JSON document
    CreateTransaction {
        /// Transaction fields as JSON, e.g. '{"amount": 100}'
        #[arg(long)]
        data: String,
    },
    /// Show the latest credit score
    Score,
    /// Show blockchain history
    Blockchain,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    log::error!("Failed to render response: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Value, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    log::info!("Using TrustFlow API at {}", config.base_url);

    let store = Arc::new(KeychainTokenStore::new(config.keychain_service.clone()));
    let redirect = Arc::new(LoginRedirect::new(config.login_url.clone()));
    let client = ApiClient::builder(config)
        .token_store(store)
        .on_unauthorized(redirect)
        .build()?;

    let output = match cli.command {
        Command::Login { email, password } => {
            let auth = client.sign_in(&email, &password).await?;
            log::info!("Signed in as {}", email);
            serde_json::to_value(auth)?
        }
        Command::Logout => {
            client.clear_token().await?;
            serde_json::json!({ "logged_out": true })
        }
        Command::Register {
            email,
            password,
            full_name,
            phone,
            wallet_address,
        } => {
            let request = RegisterRequest {
                email,
                password,
                full_name,
                phone,
                wallet_address,
            };
            client.register(&request).await?
        }
        Command::Me => client.get_current_user().await?,
        Command::UpdateUser { full_name, phone } => {
            client
                .update_user(&UserUpdate { full_name, phone })
                .await?
        }
        Command::Profile => client.get_profile().await?,
        Command::UpdateProfile {
            date_of_birth,
            address,
            employment_status,
            monthly_income,
        } => {
            let update = ProfileUpdate {
                date_of_birth,
                address,
                employment_status,
                monthly_income,
            };
            client.update_profile(&update).await?
        }
        Command::Rating => client.get_user_with_rating().await?,
        Command::Transactions => client.get_transactions().await?,
        Command::CreateTransaction { data } => {
            let transaction: Value = serde_json::from_str(&data)?;
            client.create_transaction(&transaction).await?
        }
        Command::Score => client.get_credit_score().await?,
        Command::Blockchain => client.get_blockchain_history().await?,
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_arguments() {
        let cli = Cli::try_parse_from([
            "trustflow",
            "login",
            "--email",
            "a@b.com",
            "--password",
            "secret",
        ])
        .unwrap();
        match cli.command {
            Command::Login { email, password } => {
                assert_eq!(email, "a@b.com");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(cli.api_url.is_none());
    }

    #[test]
    fn api_url_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "trustflow",
            "score",
            "--api-url",
            "http://127.0.0.1:9000/api",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Score));
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000/api"));
    }

    #[test]
    fn create_transaction_requires_data() {
        assert!(Cli::try_parse_from(["trustflow", "create-transaction"]).is_err());
    }
}
