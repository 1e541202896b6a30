//! 隐藏终端仿真
//!
//! A -> B <- C，A 与 C 互相听不到；比较基本接入与 RTS/CTS 下 B 处的碰撞率。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use wifisim_rs::net::FrameKind;
use wifisim_rs::sim::SimTime;
use wifisim_rs::topo::WlanOpts;
use wifisim_rs::topo::hidden_terminal::build_hidden_terminal;

#[derive(Debug, Parser)]
#[command(name = "hidden-terminal", about = "隐藏终端仿真：A->B<-C")]
struct Args {
    #[arg(long, default_value_t = 1024)]
    payload_bytes: u32,
    /// 每条流的发送速率（bps）
    #[arg(long, default_value_t = 11_000_000)]
    rate_bps: u64,
    /// RTS 门限（字节）；不给则关闭 RTS/CTS，0 表示所有单播数据帧
    #[arg(long)]
    rts_threshold: Option<u32>,
    #[arg(long, default_value_t = 200)]
    start_ms: u64,
    #[arg(long, default_value_t = 2_000)]
    stop_ms: u64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long)]
    trace_json: Option<PathBuf>,
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

    let (mut sc, topo) = build_hidden_terminal(&opts)?;
    let stats = sc.run(opts.until())?;

    for f in &stats.flows {
        println!("{f}");
    }
    let at_b = sc.trace().summary(FrameKind::Data, Some(topo.b.0));
    println!(
        "done @ {:?}, data_at_b_succeeded={}, data_at_b_collided={}, collision_rate={:.3}",
        sc.now(),
        at_b.succeeded,
        at_b.collided,
        at_b.collision_rate()
    );

    if let Some(path) = &args.trace_json {
        fs::write(path, sc.trace().to_json_pretty()?)?;
    }
    if let Some(path) = &args.stats_json {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
    }
    Ok(())
}

fn main() {
    // 初始化 tracing
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
        eprintln!("hidden-terminal: {e}");
        std::process::exit(1);
    }
}
