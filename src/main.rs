use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use group_draw::report::{render_json, render_text};
use group_draw::{Category, DrawError, LineOutcome, Roster};

#[derive(Parser, Debug)]
#[command(name = "group-draw")]
#[command(about = "Draw equal-size groups, keeping requested pairs together")]
struct Cli {
    /// Roster file (TOML). Participants are read from stdin when omitted.
    #[arg(long, short, env = "GROUP_DRAW_ROSTER")]
    roster: Option<PathBuf>,

    /// Members per group (overrides the roster's group_size)
    #[arg(long, short = 's', env = "GROUP_DRAW_SIZE")]
    group_size: Option<usize>,

    /// Seed for the shuffle, for a reproducible draw
    #[arg(long, env = "GROUP_DRAW_SEED")]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(unix)]
fn stdin_is_tty() -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::isatty(io::stdin().as_raw_fd()) == 1 }
}

#[cfg(not(unix))]
fn stdin_is_tty() -> bool {
    true
}

fn category_name(category: Category) -> &'static str {
    match category {
        Category::Male => "남",
        Category::Female => "여",
    }
}

fn read_roster_from_stdin(running: Arc<AtomicBool>) -> Roster {
    let interactive = stdin_is_tty();
    let mut roster = Roster::default();

    if interactive {
        println!("참가자를 한 줄에 하나씩 입력하세요:");
        println!("  - 'm:이름' / 'f:이름': 남학생 / 여학생 추가");
        println!("  - 'pair:이름1,이름2': 같은 조 희망");
        println!("  - 'size:숫자': 조당 인원");
        println!("  - 'delete:이름': 참가자 삭제");
        println!("  - Ctrl+D (Unix/Mac) 또는 Ctrl+Z+Enter (Windows): 입력 종료");
        println!("  - Ctrl+C: 입력을 멈추고 조 추첨");
        println!();
    }

    let lines = io::stdin()
        .lock()
        .lines()
        .map_while(|line| {
            line.map_err(|err| warn!(error = %err, "stopped reading stdin"))
                .ok()
        })
        .take_while(|_| running.load(Ordering::SeqCst));

    if !interactive {
        roster.apply_lines(lines);
        return roster;
    }

    for line in lines {
        match roster.apply_line(&line) {
            Ok(outcome) => match outcome {
                LineOutcome::Skipped => {}
                LineOutcome::Added(category, id) => {
                    println!("  추가: {} ({})", id, category_name(category))
                }
                LineOutcome::Paired(pref) => println!("  짝 등록: {} & {}", pref.0, pref.1),
                LineOutcome::GroupSize(size) => println!("  조당 인원: {} 명", size),
                LineOutcome::Removed(_, id, pairs) => {
                    println!("  ✓ 삭제했습니다: {} (짝 {}개 함께 삭제)", id, pairs)
                }
                LineOutcome::NotFound(id) => {
                    println!("  ✗ 오류: {} 은(는) 찾을 수 없습니다", id)
                }
            },
            Err(err) => println!("  ✗ 오류: {}", err),
        }
    }

    roster
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let roster = match &cli.roster {
        Some(path) => Roster::load(path)?,
        None => {
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || {
                println!(
                    "\n\nCtrl+C 가 눌렸습니다. 입력을 마칩니다... 결과를 보려면 Enter를 누르세요."
                );
                r.store(false, Ordering::SeqCst);
            })
            .context("failed to install Ctrl+C handler")?;
            read_roster_from_stdin(running)
        }
    };

    if roster.is_empty() {
        println!("\n입력된 참가자가 없습니다.");
        return Ok(());
    }

    let group_size = roster.resolve_group_size(cli.group_size)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        participants = roster.total(),
        group_size,
        seed = ?cli.seed,
        "drawing groups"
    );

    let draw = match roster.draw_with_rng(group_size, &mut rng) {
        Ok(draw) => draw,
        Err(err) => {
            if let DrawError::SizeMismatch {
                total,
                group_size,
                suggestions,
            } = &err
            {
                eprintln!(
                    "⚠️ 인원이 {total}명인데 {group_size}명씩은 정확히 나눠지지 않습니다."
                );
                if !suggestions.is_empty() {
                    let sizes: Vec<String> =
                        suggestions.iter().map(|s| format!("{s}명")).collect();
                    eprintln!("→ 추천: {}", sizes.join(" 혹은 "));
                }
            }
            return Err(err).context("group draw failed");
        }
    };

    match cli.format {
        OutputFormat::Text => print!("\n{}", render_text(&draw)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&draw).context("failed to serialize draw")?
        ),
    }

    Ok(())
}
