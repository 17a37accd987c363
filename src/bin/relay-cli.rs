use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the casino relay API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay and ledger status
    Health,
    /// Record a deposit to the treasury
    Deposit {
        address: String,
        amount: f64,
        #[arg(long)]
        tx: Option<String>,
    },
    /// Withdraw from the treasury to a player
    Withdraw { address: String, amount: f64 },
    /// Play a treasury-sponsored game
    Play {
        game: String,
        address: String,
        bet: f64,
        /// Game parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Run commit-reveal and print the random value
    Entropy { game: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Deposit { address, amount, tx } => {
            let body = json!({"userAddress": address, "amount": amount, "transactionHash": tx});
            client.post(format!("{}/api/deposit", base)).json(&body).send().await?
        }
        Commands::Withdraw { address, amount } => {
            let body = json!({"userAddress": address, "amount": amount});
            client.post(format!("{}/api/withdraw", base)).json(&body).send().await?
        }
        Commands::Play { game, address, bet, params } => {
            let params: Value = serde_json::from_str(&params)?;
            let body = json!({"gameType": game, "userAddress": address, "betAmount": bet, "gameParams": params});
            client.post(format!("{}/api/flow-vrf", base)).json(&body).send().await?
        }
        Commands::Entropy { game } => {
            let body = json!({"gameType": game, "gameConfig": {}});
            client.post(format!("{}/api/generate-entropy", base)).json(&body).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{}", pretty);
            } else {
                eprintln!("Error: relay returned status {}", status);
                eprintln!("{}", pretty);
            }
        }
        Err(_) => eprintln!("Error: relay returned status {}: {}", status, text),
    }
    Ok(())
}
