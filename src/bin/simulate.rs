use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_rogue_sim::input::{InputState, Key, KeyLatch};
use maze_rogue_sim::render::JsonLinesRenderer;
use maze_rogue_sim::types::{Direction, EntityKind};
use maze_rogue_sim::{GameDriver, GameSession, World, WorldConfig};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const HEAL_THRESHOLD: i32 = 4;
const SHOP_SAFE_DISTANCE: i32 = 6;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    cols: Option<i32>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long, default_value_t = 3000)]
    ticks: u64,
    #[arg(long, default_value_t = 1)]
    runs: u32,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run through the paced driver instead of the batch loop.
    #[arg(long)]
    realtime: bool,
    /// Print every frame as a JSON line on stdout.
    #[arg(long)]
    frames: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    ticks_survived: u64,
    game_over: bool,
    kills: u32,
    points: u32,
    wave: u32,
    enemies_spawned: u32,
    items_spawned: u32,
    items_picked: u32,
    projectiles_fired: u32,
    final_hp: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    run_id: String,
    started_at: String,
    finished_at: String,
    scenario_count: usize,
    anomaly_count: usize,
    game_over_count: usize,
    average_ticks: u64,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredLogLine {
    timestamp_ms: i64,
    level: String,
    event: String,
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Scripted player: shoots aligned hostiles, chases the rest, grabs items.
#[derive(Debug, Default)]
struct Autopilot {
    keys: KeyLatch,
}

impl InputState for Autopilot {
    fn is_pressed(&self, key: Key) -> bool {
        self.keys.is_pressed(key)
    }

    fn clear(&mut self) {
        self.keys.clear();
    }

    fn prepare(&mut self, session: &GameSession) {
        self.keys.clear();
        for key in plan(session) {
            self.keys.press(key);
        }
    }
}

fn direction_key(direction: Direction) -> Key {
    match direction {
        Direction::North => Key::Up,
        Direction::South => Key::Down,
        Direction::West => Key::Left,
        Direction::East => Key::Right,
    }
}

fn plan(session: &GameSession) -> Vec<Key> {
    if session.upgrades().is_active() {
        return vec![Key::Digit(1)];
    }
    if session.shop().is_active() {
        let available = session.points().total();
        let cheapest = session
            .shop()
            .offers()
            .iter()
            .enumerate()
            .take(9)
            .filter(|(_, offer)| offer.cost <= available)
            .min_by_key(|(_, offer)| offer.cost);
        return match cheapest {
            Some((idx, _)) => vec![Key::Digit(idx as u8 + 1)],
            None => vec![Key::Cancel],
        };
    }

    let world = session.world();
    if world.is_game_over() {
        return Vec::new();
    }
    let Some(player) = world.player() else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    let facing = player.facing_cell();
    if world
        .entities()
        .iter()
        .any(|e| e.kind == EntityKind::Item && e.position() == facing)
    {
        keys.push(Key::Interact);
    }
    if player.hp() <= HEAL_THRESHOLD {
        keys.push(Key::AbilityHeal);
    }

    let nearest_hostile = world
        .entities()
        .iter()
        .filter(|e| e.kind.is_hostile())
        .min_by_key(|e| (e.distance_to(player), e.id));

    match nearest_hostile {
        Some(target) => {
            let (dx, dy) = (target.x - player.x, target.y - player.y);
            let direction = Direction::toward(dx, dy);
            let aligned = dx == 0 || dy == 0;
            if aligned && target.distance_to(player) <= player.range_stat() && player.direction == direction {
                keys.push(Key::Shoot);
            } else {
                keys.push(direction_key(direction));
            }
            if target.distance_to(player) >= SHOP_SAFE_DISTANCE && can_afford_shop(session) {
                keys.push(Key::Shop);
            }
        }
        None => {
            let nearest_item = world
                .entities()
                .iter()
                .filter(|e| e.kind == EntityKind::Item)
                .min_by_key(|e| (e.distance_to(player), e.id));
            if let Some(item) = nearest_item {
                if item.position() != facing {
                    keys.push(direction_key(Direction::toward(item.x - player.x, item.y - player.y)));
                }
            }
            if can_afford_shop(session) {
                keys.push(Key::Shop);
            }
        }
    }
    keys
}

fn can_afford_shop(session: &GameSession) -> bool {
    // Cheapest stock offer.
    session.points().total() >= 50
}

fn collect_world_anomalies(world: &World) -> Vec<String> {
    let mut anomalies = Vec::new();
    let mut occupied: HashMap<(i32, i32), u64> = HashMap::new();
    for entity in world.entities() {
        if entity.hp() < 0 {
            anomalies.push(format!("negative hp: entity {} hp {}", entity.id.0, entity.hp()));
        }
        if entity.kind == EntityKind::Projectile {
            continue;
        }
        if let Some(other) = occupied.insert((entity.x, entity.y), entity.id.0) {
            anomalies.push(format!(
                "occupancy collision at ({}, {}): {} and {}",
                entity.x, entity.y, other, entity.id.0
            ));
        }
    }
    for projectile in world.projectiles() {
        if projectile.distance_traveled > projectile.max_distance {
            anomalies.push(format!(
                "projectile {} beyond range: {}/{}",
                projectile.entity.0, projectile.distance_traveled, projectile.max_distance
            ));
        }
    }
    anomalies
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let base_config = resolve_config(&cli)?;
    let scenarios = resolve_scenarios(&cli, &base_config);
    let started_at = Utc::now();
    let run_id = default_run_id(
        scenarios.first().map(|s| s.seed).unwrap_or(0),
        started_at.timestamp_millis(),
    );

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "ticks": scenario.ticks,
                "cols": base_config.cols,
                "rows": base_config.rows,
                "realtime": cli.realtime,
            }),
        );

        let config = WorldConfig {
            seed: Some(scenario.seed),
            ..base_config.clone()
        };
        let scenario_run = if cli.realtime {
            run_realtime(&scenario, config, cli.frames).await
        } else {
            run_scenario(&scenario, config, cli.frames)?
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks_survived),
            json!({
                "gameOver": scenario_run.result.game_over,
                "kills": scenario_run.result.kills,
                "points": scenario_run.result.points,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).context("encode scenario result")?
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": format!("{error:#}"),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "gameOverCount": summary.game_over_count,
            "averageTicks": summary.average_ticks,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_config(cli: &Cli) -> Result<WorldConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => WorldConfig::from_json_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => WorldConfig::default(),
    };
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.validate().context("invalid world config")?;
    Ok(config)
}

fn resolve_scenarios(cli: &Cli, config: &WorldConfig) -> Vec<Scenario> {
    let seed = config.seed.unwrap_or_else(rand::random::<u32>);
    (0..cli.runs.max(1))
        .map(|idx| Scenario {
            name: format!("autopilot-{}", idx + 1),
            seed: seed.wrapping_add(idx),
            ticks: cli.ticks,
        })
        .collect()
}

fn run_scenario(scenario: &Scenario, config: WorldConfig, frames: bool) -> Result<ScenarioRunResult> {
    let mut session = GameSession::new(config);
    let mut autopilot = Autopilot::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let stdout = io::stdout();

    for _ in 0..scenario.ticks {
        autopilot.prepare(&session);
        let frame = session.step(&mut autopilot);
        if frames {
            let line = serde_json::to_string(&frame).context("encode frame")?;
            writeln!(stdout.lock(), "{line}").context("write frame")?;
        }
        for message in collect_world_anomalies(session.world()) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                frame.tick,
                message,
            );
        }
        if session.is_game_over() {
            break;
        }
    }

    Ok(ScenarioRunResult {
        result: result_line(scenario, &session, anomalies),
        anomaly_records,
    })
}

async fn run_realtime(scenario: &Scenario, config: WorldConfig, frames: bool) -> ScenarioRunResult {
    let session = if frames {
        drive(config, io::stdout(), scenario.ticks).await
    } else {
        drive(config, io::sink(), scenario.ticks).await
    };

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    for message in collect_world_anomalies(session.world()) {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            session.world().tick(),
            message,
        );
    }
    ScenarioRunResult {
        result: result_line(scenario, &session, anomalies),
        anomaly_records,
    }
}

async fn drive<W: Write>(config: WorldConfig, out: W, ticks: u64) -> GameSession {
    let mut driver = GameDriver::new(config, JsonLinesRenderer::new(out, 0), Autopilot::default())
        .with_max_steps(ticks);
    driver.run().await;
    let (session, _, _) = driver.into_parts();
    session
}

fn result_line(scenario: &Scenario, session: &GameSession, anomalies: Vec<String>) -> ScenarioResultLine {
    let stats = session.stats();
    ScenarioResultLine {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        ticks_survived: session.world().tick(),
        game_over: session.is_game_over(),
        kills: stats.kills,
        points: session.points().total(),
        wave: session.waves().wave(),
        enemies_spawned: stats.enemies_spawned,
        items_spawned: stats.items_spawned,
        items_picked: stats.items_picked,
        projectiles_fired: stats.projectiles_fired,
        final_hp: session.world().player().map(|p| p.hp()).unwrap_or(0),
        anomalies,
    }
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_ticks: u64 = scenarios.iter().map(|s| s.ticks_survived).sum();
    let average_ticks = if scenario_count == 0 {
        0
    } else {
        total_ticks / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        game_over_count: scenarios.iter().filter(|s| s.game_over).count(),
        average_ticks,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: Utc::now().timestamp_millis(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => tracing::warn!(%error, event, "failed to encode log line"),
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).context("encode run summary")?;
    std::fs::write(path, summary_text).with_context(|| format!("write {}", path.display()))
}
