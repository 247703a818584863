//! Search connpass and print matching event titles.
//!
//! ```text
//! cargo run -p connpass-core --example search -- --keyword rust --count 5
//! ```

use clap::Parser;
use connpass_core::{ConnpassClient, OrderBy, Param, DEFAULT_BASE_URL};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Search connpass events")]
struct Args {
    /// Keywords an event must all match.
    #[arg(short, long)]
    keyword: Vec<String>,

    /// Events held in this month, as YYYYMM.
    #[arg(long, value_parser = parse_year_month)]
    ym: Option<(i32, u32)>,

    /// 1 = updated, 2 = date, 3 = newest.
    #[arg(long)]
    order: Option<i64>,

    #[arg(short, long, default_value_t = 10)]
    count: i64,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

fn parse_year_month(s: &str) -> Result<(i32, u32), String> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected YYYYMM, got {s}"));
    }
    let year = s[..4].parse().map_err(|e| format!("{s}: {e}"))?;
    let month = s[4..].parse().map_err(|e| format!("{s}: {e}"))?;
    Ok((year, month))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut params: Vec<Param> = args.keyword.into_iter().map(Param::keyword).collect();
    if let Some((year, month)) = args.ym {
        params.push(Param::year_month(year, month));
    }
    if let Some(order) = args.order {
        params.push(Param::order(OrderBy(order)));
    }
    params.push(Param::count(args.count));

    let client = ConnpassClient::builder().base_url(args.base_url).build();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let result = client.search_with(&cancel, params).await?;
    tracing::info!(
        returned = result.returned,
        available = result.available,
        "search complete"
    );
    for event in &result.events {
        println!("{}", event.title);
    }
    Ok(())
}
