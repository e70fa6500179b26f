use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings,
    validation::{CloseAccountForm, CreateAccountForm, DateRangeForm, TransferForm},
    view::{balance_hint, AccountTypeInfo, ACCOUNT_TYPE_PROMPT},
    ActionSubmitter, BankingClient, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

mod surface;

use surface::TerminalSurface;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the server url from teller.toml / environment.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new account.
    CreateAccount {
        #[arg(long, default_value = "")]
        account_type: String,
        #[arg(long, default_value = "")]
        initial_deposit: String,
    },
    /// Move money between two accounts.
    Transfer {
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long, default_value = "")]
        to: String,
        #[arg(long, default_value = "")]
        amount: String,
        #[arg(long, default_value = "")]
        transfer_type: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Balance of the source account, shown before submitting.
        #[arg(long)]
        from_balance: Option<String>,
    },
    /// Close an account. Requires typing CLOSE.
    CloseAccount {
        #[arg(long)]
        account_id: String,
        #[arg(long, default_value = "")]
        confirmation: String,
    },
    Account {
        id: String,
    },
    Transaction {
        id: String,
    },
    /// Jump to the transactions listing for a date range.
    Filter {
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        end_date: String,
    },
    /// Describe an account type.
    AccountTypeInfo {
        #[arg(default_value = "")]
        account_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(server_url) = args.server_url {
        settings.server_url = client_core::config::normalize_server_url(&server_url);
    }

    let client = BankingClient::new(&settings.server_url)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    let surface = Arc::new(TerminalSurface);
    let submitter = ActionSubmitter::new(Arc::new(client), surface, &settings);

    let outcome = match args.command {
        Command::CreateAccount {
            account_type,
            initial_deposit,
        } => {
            submitter
                .submit_create_account(&CreateAccountForm {
                    account_type,
                    initial_deposit,
                })
                .await
        }
        Command::Transfer {
            from,
            to,
            amount,
            transfer_type,
            description,
            from_balance,
        } => {
            if let Some(balance) = balance_hint(from_balance.as_deref()) {
                println!("Available balance: {balance}");
            }
            submitter
                .submit_transfer(&TransferForm {
                    from_account: from,
                    to_account: to,
                    amount,
                    transfer_type,
                    description,
                })
                .await
        }
        Command::CloseAccount {
            account_id,
            confirmation,
        } => {
            submitter
                .submit_close_account(&CloseAccountForm {
                    account_id,
                    confirmation,
                })
                .await
        }
        Command::Account { id } => {
            let Some(view) = submitter.load_account_details(&id).await else {
                return Ok(ExitCode::FAILURE);
            };
            println!("Account number: {}", view.account_number);
            println!("Type:           {}", view.account_type);
            println!("Balance:        {}", view.balance);
            println!("Status:         {}", view.status);
            println!("Opened:         {}", view.created);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Transaction { id } => {
            let Some(view) = submitter.load_transaction_details(&id).await else {
                return Ok(ExitCode::FAILURE);
            };
            println!("Transaction:    {}", view.id);
            println!("Type:           {}", view.transaction_type);
            println!("Amount:         {} ({})", view.amount, view.amount_class);
            println!("Date:           {}", view.date);
            println!("Status:         {}", view.status);
            println!("Description:    {}", view.description);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Filter {
            start_date,
            end_date,
        } => {
            submitter
                .filter_transactions_by_date(&DateRangeForm {
                    start_date,
                    end_date,
                })
                .await
        }
        Command::AccountTypeInfo { account_type } => {
            match AccountTypeInfo::for_selection(&account_type) {
                Some(info) => {
                    println!("{}", info.title);
                    println!("{}", info.summary);
                    for feature in info.features {
                        println!("  - {feature}");
                    }
                }
                None => println!("{ACCOUNT_TYPE_PROMPT}"),
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    // Let the deferred redirect happen before the process exits.
    submitter.settle().await;
    Ok(match outcome {
        SubmitOutcome::Completed { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
