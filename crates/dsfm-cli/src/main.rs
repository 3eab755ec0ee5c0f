use anyhow::{bail, Result};
use decision_engine::{DsfmConfig, DsfmService};
use serde::Serialize;
use serde_json::json;

const USAGE: &str = "usage: dsfm <command> [SYMBOL]

commands:
  top-stocks          Sharpe-ranked risk table
  forecast SYMBOL     AR / seasonal AR / GARCH price paths
  sentiment SYMBOL    news sentiment report
  decision SYMBOL     BUY / WAIT / AVOID / HOLD signal
  insights            breadth, sector moves and momentum
  movers              top gainers and losers
  most-bought         biggest gainer of the day
  index               equal-weight index snapshot
  index-history       recent equal-weight index values
  stock SYMBOL        single stock snapshot
  portfolio           demo one-share portfolio";

#[derive(Debug, PartialEq)]
enum Command {
    TopStocks,
    Forecast(String),
    Sentiment(String),
    Decision(String),
    Insights,
    Movers,
    MostBought,
    Index,
    IndexHistory,
    Stock(String),
    Portfolio,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        bail!("missing command\n\n{}", USAGE);
    };
    let symbol = || -> Result<String> {
        match args.get(1) {
            Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => bail!("'{}' needs a SYMBOL\n\n{}", command, USAGE),
        }
    };

    let parsed = match command.as_str() {
        "top-stocks" => Command::TopStocks,
        "forecast" => Command::Forecast(symbol()?),
        "sentiment" => Command::Sentiment(symbol()?),
        "decision" => Command::Decision(symbol()?),
        "insights" => Command::Insights,
        "movers" => Command::Movers,
        "most-bought" => Command::MostBought,
        "index" => Command::Index,
        "index-history" => Command::IndexHistory,
        "stock" => Command::Stock(symbol()?),
        "portfolio" => Command::Portfolio,
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    };
    Ok(parsed)
}

/// Serialize `value`, or an `{"error": ..}` object when absent.
fn render<T: Serialize>(value: Option<T>, missing: &str) -> Result<serde_json::Value> {
    Ok(match value {
        Some(v) => serde_json::to_value(v)?,
        None => json!({ "error": missing }),
    })
}

async fn run(service: &DsfmService, command: Command) -> Result<serde_json::Value> {
    match command {
        Command::TopStocks => Ok(serde_json::to_value(service.top_stocks().await)?),
        Command::Forecast(symbol) => {
            render(service.forecast(&symbol).await.as_deref(), "No forecast")
        }
        Command::Sentiment(symbol) => Ok(serde_json::to_value(service.sentiment(&symbol).await)?),
        Command::Decision(symbol) => render(service.decision(&symbol).await, "No forecast"),
        Command::Insights => render(service.market_insights().await, "No data"),
        Command::Movers => render(service.market_movers().await, "No data"),
        Command::MostBought => render(service.most_bought().await, "No data"),
        Command::Index => render(service.index_snapshot().await, "No data"),
        Command::IndexHistory => Ok(serde_json::to_value(service.index_history().await)?),
        Command::Stock(symbol) => render(service.stock_snapshot(&symbol).await, "Symbol not found"),
        Command::Portfolio => render(service.portfolio().await, "No data"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let config = DsfmConfig::from_env()?;
    let service = DsfmService::from_config(&config)?;
    tracing::info!("Market data: {}", service.store().path().display());
    tracing::info!("Holdings: {}", config.holdings_csv.display());
    tracing::info!("Forecast timeout: {}s", config.forecast_timeout_secs);

    let output = run(&service, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
