//! 场景文件仿真
//!
//! 读取 scenario.json，运行并打印各业务流统计。

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use wifisim_rs::net::FrameKind;
use wifisim_rs::scenario::{Scenario, ScenarioSpec};

#[derive(Debug, Parser)]
#[command(name = "scenario-sim", about = "在 802.11 DCF 仿真器上运行 scenario.json")]
struct Args {
    /// scenario.json 路径
    #[arg(long)]
    scenario: PathBuf,

    /// 运行到该时刻（毫秒）；缺省取场景的 until_ms，或最后一条流结束后再加 100ms
    #[arg(long)]
    until_ms: Option<f64>,

    /// 覆盖随机数种子
    #[arg(long)]
    seed: Option<u64>,

    /// 覆盖 RTS 门限（字节；0 表示所有单播数据帧都走 RTS/CTS）
    #[arg(long)]
    rts_threshold: Option<u32>,

    /// 输出逐帧 trace 的 JSON 文件
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// 输出各业务流统计的 JSON 文件
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(&args.scenario)?;
    let mut spec = ScenarioSpec::from_json(&raw)?;
    if let Some(seed) = args.seed {
        spec.seed = Some(seed);
    }
    if let Some(t) = args.rts_threshold {
        spec.mac.get_or_insert_with(Default::default).rts_threshold = Some(t);
    }
    if let Some(ms) = args.until_ms {
        spec.until_ms = Some(ms);
    }
    let until = spec.default_until()?;

    let mut sc = Scenario::build(&spec)?;
    let stats = sc.run(until)?;

    for f in &stats.flows {
        println!("{f}");
    }
    let data = sc.trace().summary(FrameKind::Data, None);
    println!(
        "done @ {:?}, sent={}, received={}, data_succeeded={}, data_collided={}, data_collision_rate={:.3}",
        sc.now(),
        stats.total_sent(),
        stats.total_received(),
        data.succeeded,
        data.collided,
        data.collision_rate()
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
        eprintln!("scenario-sim: {e}");
        std::process::exit(1);
    }
}
