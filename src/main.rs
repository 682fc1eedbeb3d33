// brs-play: compile a BMS chart and optionally autoplay it through the judge.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use brs_play::bms::{Chart, KeyMode, load_chart};
use brs_play::config::PlayConfig;
use brs_play::game::{JudgeTier, PlayResult, PlaySession};
use brs_play::traits::time::{MockTimeProvider, PlaybackClock};
use brs_play::util::logging::init_logging;

const FRAME_US: i64 = 16_667;

#[derive(Parser, Debug)]
#[command(name = "brs-play", about = "BMS timeline compiler and judgment engine")]
struct Args {
    /// Path to the BMS chart.
    chart: PathBuf,

    /// Path to play config JSON file.
    #[arg(long, env = "BRS_PLAY_CONFIG", default_value = "play_config.json")]
    config: PathBuf,

    /// Play the chart with perfect input and print the result.
    #[arg(long)]
    autoplay: bool,

    /// Print JSON instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Fold notes onto a key layout (6 = 5-key, 8 = 7-key).
    #[arg(long)]
    keys: Option<usize>,

    /// Show debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = PlayConfig::load_from(&args.config)?;
    if let Some(keys) = args.keys {
        if KeyMode::from_lane_count(keys).is_none() {
            bail!("unsupported key layout: {keys} lanes (expected 6 or 8)");
        }
        config.lane_count = Some(keys);
    }

    info!("Loading chart {}", args.chart.display());
    let chart = load_chart(&args.chart)?;

    if args.autoplay {
        let result = autoplay(&chart, &config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print_summary(&chart);
    }
    Ok(())
}

/// Perfect input at every note start and hold end, fed to the session at a
/// fixed frame rate.
fn autoplay(chart: &Chart, config: &PlayConfig) -> PlayResult {
    let mut session = PlaySession::from_chart(chart, config);

    // (time, lane, is_press); releases sort before presses at the same time.
    let mut inputs: Vec<(f64, usize, bool)> = Vec::new();
    for note in session.notes() {
        inputs.push((note.time, note.lane, true));
        if note.is_hold() {
            inputs.push((note.end_time(), note.lane, false));
        }
    }
    inputs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

    let provider = MockTimeProvider::new();
    let clock = PlaybackClock::new(&provider);
    let offset = config.clock_offset();
    let mut pending = inputs.into_iter().peekable();

    loop {
        provider.advance(FRAME_US);
        let now = clock.read(offset);

        while let Some((time, lane, is_press)) = pending.next_if(|input| input.0 <= now) {
            if is_press {
                session.press(lane, time);
            } else {
                session.release(lane, time);
            }
        }

        if now >= chart.duration {
            session.finish(now);
            break;
        }
        session.tick(now);
        if !session.is_playing() {
            break;
        }
    }

    session.result()
}

fn print_summary(chart: &Chart) {
    let meta = &chart.metadata;
    println!("{} / {}", meta.title, meta.artist);
    if !meta.genre.is_empty() {
        println!("genre:    {}", meta.genre);
    }
    println!("bpm:      {}", meta.initial_bpm);
    println!(
        "mode:     {}",
        match chart.key_mode() {
            KeyMode::Beat5K => "5K",
            KeyMode::Beat7K => "7K",
        }
    );
    println!(
        "notes:    {} ({} holds)",
        chart.note_count(),
        chart.notes.iter().filter(|n| n.is_hold()).count()
    );
    println!("bgm:      {}", chart.bgm_events.len());
    println!(
        "tempo:    {} changes, {} stops",
        chart.bpms.len().saturating_sub(1),
        chart.stops.len()
    );
    println!("duration: {:.3}s", chart.duration);
}

fn print_result(result: &PlayResult) {
    println!("{} / {}", result.title, result.artist);
    println!("status:    {:?}", result.status);
    println!("score:     {}", result.score);
    println!("max combo: {}/{}", result.max_combo, result.total_notes);
    let counts = [
        (JudgeTier::Best, result.best_count),
        (JudgeTier::Good, result.good_count),
        (JudgeTier::Bad, result.bad_count),
        (JudgeTier::Miss, result.miss_count),
    ];
    let judge_line: Vec<String> = counts
        .iter()
        .map(|(tier, count)| format!("{} {count}", tier.name()))
        .collect();
    println!("judge:     {}", judge_line.join(" / "));
    println!("fast/slow: {}/{}", result.fast_count, result.slow_count);
    println!("accuracy:  {:.2}% ({})", result.accuracy(), result.rank());
}
