//! cc-runner: headless driver for the credit & rank engine.
//!
//! Usage:
//!   cc-runner --seed 12345 --sales 500 --config data/engine_config.json
//!   cc-runner --ipc-mode --participant fbo-001

mod rng;

use anyhow::Result;
use credit_rank_core::{
    config::EngineConfig,
    engine::CreditEngine,
    event::EngineEvent,
    participant::{Participant, Role},
    registry::ParticipantRegistry,
    valuation::{SaleSubmission, SaleType},
};
use rng::SaleRng;
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Sale {
        amount: f64,
        sale_type: String,
        #[serde(default)]
        transaction_id: Option<String>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    participant_id: &'a str,
    role: Role,
    case_credits: f64,
    rank_id: &'a str,
    rank_name: &'a str,
    cycle_cc: f64,
    target_cc: f64,
    remaining_cc: f64,
    progress: f64,
    promotions: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let sales = parse_arg(&args, "--sales", 365usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = string_arg(&args, "--config");
    let participant_id = string_arg(&args, "--participant").unwrap_or("fbo-001");

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::standard(),
    };

    if !ipc_mode {
        println!("Credit & Rank Engine: cc-runner");
        println!("  seed:        {seed}");
        println!("  sales:       {sales}");
        println!("  config:      {}", config_path.unwrap_or("(built-in ladder)"));
        println!("  participant: {participant_id}");
        println!();
    }

    let engine = Arc::new(CreditEngine::build(config)?);
    let registry = ParticipantRegistry::new(engine);
    registry.enroll(participant_id, Role::Student)?;

    if ipc_mode {
        run_ipc_loop(&registry, participant_id)?;
    } else {
        run_replay(&registry, participant_id, seed, sales)?;
        print_summary(&registry, participant_id, sales)?;
    }

    Ok(())
}

/// Push `count` seeded random sales through the engine.
fn run_replay(
    registry: &ParticipantRegistry,
    participant_id: &str,
    seed: u64,
    count: usize,
) -> Result<()> {
    let mut rng = SaleRng::new(seed);
    for i in 0..count {
        let sale_type = if rng.chance(0.7) { SaleType::Retail } else { SaleType::Wholesale };
        let amount = rng.sale_amount(20.0, 1.6, 2_000.0);
        let submission = SaleSubmission::new(amount, sale_type)
            .with_transaction_id(format!("replay-{seed}-{i:06}"));

        let outcome = registry.process_sale(participant_id, &submission)?;
        for event in &outcome.events {
            if let EngineEvent::RankPromoted { from_rank, to_rank, total_cc_at_time, .. } = event {
                println!(
                    "  sale #{i:<5} {from_rank:>7} -> {to_rank:<7} at {total_cc_at_time:.3} CC"
                );
            }
        }
    }
    Ok(())
}

fn run_ipc_loop(registry: &ParticipantRegistry, participant_id: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let p = registry.snapshot(participant_id)?;
                writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(registry, &p))?)?;
            }
            IpcCommand::Sale { amount, sale_type, transaction_id } => {
                let submission = SaleSubmission {
                    amount,
                    sale_type,
                    transaction_id,
                    timestamp: None,
                };
                match registry.process_sale(participant_id, &submission) {
                    Ok(outcome) => {
                        let state = build_ui_state(registry, &outcome.participant);
                        let reply = serde_json::json!({
                            "state":  state,
                            "sale":   outcome.sale,
                            "events": outcome.events,
                        });
                        writeln!(stdout, "{}", reply)?;
                    }
                    Err(e) => {
                        let err_json = serde_json::json!({
                            "error": e.to_string(),
                            "kind":  e.kind(),
                        });
                        writeln!(stdout, "{}", err_json)?;
                    }
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<'a>(registry: &'a ParticipantRegistry, p: &'a Participant) -> UiState<'a> {
    let progress = &p.rank_progress;
    let rank_name = registry
        .engine()
        .ranks()
        .get(&progress.current_rank_id)
        .map(|r| r.display_name.as_str())
        .unwrap_or("unknown");

    UiState {
        participant_id: &p.participant_id,
        role: p.role,
        case_credits: p.case_credits,
        rank_id: &progress.current_rank_id,
        rank_name,
        cycle_cc: progress.current_cycle_cc,
        target_cc: progress.target_cc,
        remaining_cc: progress.remaining_cc(),
        progress: progress.progress_ratio(),
        promotions: progress.history().len(),
    }
}

fn print_summary(registry: &ParticipantRegistry, participant_id: &str, sales: usize) -> Result<()> {
    let p = registry.snapshot(participant_id)?;
    let state = build_ui_state(registry, &p);

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  participant:   {}", state.participant_id);
    println!("  sales:         {sales}");
    println!("  role:          {}", state.role);
    println!("  lifetime CC:   {:.3}", state.case_credits);
    println!("  rank:          {} ({})", state.rank_name, state.rank_id);
    println!(
        "  cycle:         {:.3} / {:.3} CC ({:.1}%)",
        state.cycle_cc,
        state.target_cc,
        state.progress * 100.0
    );

    println!();
    println!("=== PROMOTION HISTORY ===");
    let history = p.rank_progress.history();
    if history.is_empty() {
        println!("  (No promotions yet)");
    } else {
        for h in history {
            println!(
                "  {} | cleared {} | lifetime {:.3} CC",
                h.date_achieved.format("%Y-%m-%d %H:%M:%S"),
                h.rank_id,
                h.total_cc_at_time
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
