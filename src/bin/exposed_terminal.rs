//! 暴露终端仿真
//!
//! A <- a <-> b <- B：a 对 B 隐藏却能干扰 b，B -> b 的数据帧在 b 处碰撞。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use wifisim_rs::net::FrameKind;
use wifisim_rs::sim::SimTime;
use wifisim_rs::topo::WlanOpts;
use wifisim_rs::topo::exposed_terminal::build_exposed_terminal;

#[derive(Debug, Parser)]
#[command(name = "exposed-terminal", about = "暴露终端仿真：a->A, B->b")]
struct Args {
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

    let (mut sc, topo) = build_exposed_terminal(&opts)?;
    let stats = sc.run(opts.until())?;

    for f in &stats.flows {
        println!("{f}");
    }
    let at_b = sc.trace().summary(FrameKind::Data, Some(topo.sta_b.0));
    println!(
        "data@b succeeded={} collided={} collision_rate={:.3}",
        at_b.succeeded,
        at_b.collided,
        at_b.collision_rate()
    );
    for node in [topo.sta_a, topo.ap_b] {
        if let Some(m) = sc.mac_stats(node) {
            println!(
                "mac node={} attempts={} successes={} failed_attempts={} drops={} max_cw={}",
                node.0, m.attempts, m.successes, m.failed_attempts, m.drops, m.max_cw
            );
        }
    }

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
        eprintln!("exposed-terminal: {e}");
        std::process::exit(1);
    }
}
