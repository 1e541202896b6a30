//! 星型竞争仿真
//!
//! n 个站点同时向一个 AP 发送，观察吞吐随站点数的变化。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use wifisim_rs::sim::SimTime;
use wifisim_rs::topo::WlanOpts;
use wifisim_rs::topo::star::build_star;

#[derive(Debug, Parser)]
#[command(name = "star-contention", about = "星型竞争仿真：n 个站点 -> AP")]
struct Args {
    /// 站点个数
    #[arg(long, default_value_t = 5)]
    stations: usize,
    #[arg(long, default_value_t = 1024)]
    payload_bytes: u32,
    #[arg(long, default_value_t = 11_000_000)]
    rate_bps: u64,
    #[arg(long)]
    rts_threshold: Option<u32>,
    #[arg(long, default_value_t = 200)]
    start_ms: u64,
    #[arg(long, default_value_t = 2_000)]
    stop_ms: u64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut opts = WlanOpts {
        payload_bytes: args.payload_bytes,
        rate_bps: args.rate_bps,
        start: SimTime::from_millis(args.start_ms),
        stop: SimTime::from_millis(args.stop_ms),
        seed: args.seed,
        ..WlanOpts::default()
    };
    opts.mac.rts_threshold = args.rts_threshold;

    let (mut sc, _star) = build_star(&opts, args.stations)?;
    let stats = sc.run(opts.until())?;

    for f in &stats.flows {
        println!("{f}");
    }
    let total: f64 = stats.flows.iter().map(|f| f.goodput_bps).sum();
    println!(
        "done @ {:?}, stations={}, aggregate_goodput_bps={:.0}",
        sc.now(),
        args.stations,
        total
    );

    if let Some(path) = &args.stats_json {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("star-contention: {e}");
        std::process::exit(1);
    }
}
