use std::fmt;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use wf_core::{ActorId, Location, WfError};
use wf_engine::{
    Engine, EngineConfig, EngineResult, MoveOutcome, MoveStatus, NavEventKind, TrackSearch,
};

use super::plural;

/// One thing the walker does.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Go(String),
    Sneak(String),
    Teleport(Location),
    Portal(Location),
    Open(String),
    Close(String),
    Lock(String),
    Unlock(String),
    Search,
    Wait(u64),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Go(exit) => write!(f, "go {exit}"),
            Self::Sneak(exit) => write!(f, "sneak {exit}"),
            Self::Teleport(at) => write!(f, "teleport {at}"),
            Self::Portal(at) => write!(f, "portal {at}"),
            Self::Open(exit) => write!(f, "open {exit}"),
            Self::Close(exit) => write!(f, "close {exit}"),
            Self::Lock(exit) => write!(f, "lock {exit}"),
            Self::Unlock(exit) => write!(f, "unlock {exit}"),
            Self::Search => write!(f, "search"),
            Self::Wait(n) => write!(f, "wait {n}"),
        }
    }
}

fn parse_step(s: &str) -> Result<Step, String> {
    let bad = |why: String| format!("bad step '{s}': {why}");
    let location = |at: &str| at.parse::<Location>().map_err(|e: WfError| bad(e.to_string()));

    if let Some(at) = s.strip_prefix('@') {
        return location(at).map(Step::Teleport);
    }
    let step = match s.split_once(':') {
        None if s == "search" => Step::Search,
        None if s == "wait" => Step::Wait(1),
        None => Step::Go(s.to_string()),
        Some(("sneak", exit)) => Step::Sneak(exit.to_string()),
        Some(("open", exit)) => Step::Open(exit.to_string()),
        Some(("close", exit)) => Step::Close(exit.to_string()),
        Some(("lock", exit)) => Step::Lock(exit.to_string()),
        Some(("unlock", exit)) => Step::Unlock(exit.to_string()),
        Some(("portal", at)) => Step::Portal(location(at)?),
        Some(("wait", n)) => Step::Wait(
            n.parse()
                .map_err(|_| bad("expected a number of ticks".into()))?,
        ),
        Some((verb, _)) => return Err(bad(format!("unknown action '{verb}'"))),
    };
    Ok(step)
}

pub fn run(file: &Path, actor: &str, steps: &[String], seed: u64, verbose: bool) -> Result<(), String> {
    let steps = steps
        .iter()
        .map(|s| parse_step(s))
        .collect::<Result<Vec<_>, _>>()?;
    let config = EngineConfig::default()
        .with_seed(seed)
        .with_max_events(500);
    let mut engine = super::build(file, config)?;
    let id = engine
        .world()
        .find_actor(actor)
        .ok_or_else(|| format!("no actor named '{actor}'"))?;
    let name = name_of(&engine, id);

    println!(
        "  {} {name} {}",
        "Walking".bold(),
        format!("({} steps, seed={seed})", steps.len()).dimmed()
    );
    println!();

    for step in &steps {
        let label = format!("{:<16}", step.to_string()).cyan();
        match perform(&mut engine, id, step) {
            Ok(line) => println!("  {label} {line}"),
            Err(e) if e.as_move().is_some() => println!("  {label} {} {e}", "refused:".red()),
            Err(e) => return Err(e.to_string()),
        }
        if engine.world().actor(id).is_some_and(|a| a.is_dead()) {
            println!();
            println!("  {} {name}", "DEAD".red().bold());
            break;
        }
    }
    println!();

    if verbose {
        println!("  {}", "Narration".bold().underline());
        println!();
        for event in engine.events().events() {
            let tick = format!("[tick {:>3}]", event.tick).dimmed();
            println!("  {tick} {}", colorize_event(&event.kind, &event.description));
        }
        if engine.events().is_empty() {
            println!("  {}", "(nothing happened)".dimmed());
        }
        println!();
    }

    let mut actors: Vec<_> = engine.world().actors().collect();
    actors.sort_by(|a, b| a.name.cmp(&b.name));
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Actor", "Location", "HP"]);
    for a in actors {
        let at = a
            .location
            .as_ref()
            .map_or_else(|| "-".to_string(), |l| place(&engine, l));
        table.add_row(vec![a.name.clone(), at, format!("{}/{}", a.hp, a.max_hp)]);
    }
    println!("{table}");

    Ok(())
}

fn perform(engine: &mut Engine, id: ActorId, step: &Step) -> EngineResult<String> {
    let line = match step {
        Step::Go(exit) => {
            let outcome = engine.go(id, exit)?;
            describe(engine, &outcome)
        }
        Step::Sneak(exit) => {
            let outcome = engine.sneak(id, exit)?;
            describe(engine, &outcome)
        }
        Step::Teleport(at) => {
            let outcome = engine.teleport(id, at)?;
            describe(engine, &outcome)
        }
        Step::Portal(at) => {
            engine.create_portal(id, at)?;
            format!("opened a portal to {at}")
        }
        Step::Open(exit) => {
            engine.open_exit(id, exit)?;
            format!("opened the {exit}")
        }
        Step::Close(exit) => {
            engine.close_exit(id, exit)?;
            format!("closed the {exit}")
        }
        Step::Lock(exit) => {
            engine.lock_exit(id, exit)?;
            format!("locked the {exit}")
        }
        Step::Unlock(exit) => {
            engine.unlock_exit(id, exit)?;
            format!("unlocked the {exit}")
        }
        Step::Search => match engine.search_tracks(id)? {
            TrackSearch::Pending { due } => format!("searching, done at tick {due}"),
            TrackSearch::Found(found) => {
                let mut line = format!("tracks lead {}", found.direction.green());
                if let Some(count) = found.count {
                    line.push_str(&format!(", {count} set{}", plural(count as usize)));
                }
                if let Some(size) = found.size {
                    line.push_str(&format!(", largest {}", format!("{size:?}").to_lowercase()));
                }
                line
            }
            TrackSearch::Nothing => "no tracks found".dimmed().to_string(),
        },
        Step::Wait(n) => {
            engine.run(*n)?;
            format!("waited until tick {}", engine.clock().tick())
        }
    };
    Ok(line)
}

fn describe(engine: &Engine, outcome: &MoveOutcome) -> String {
    if outcome.status == MoveStatus::Died {
        return "killed on the way".red().bold().to_string();
    }
    let mut line = match &outcome.destination {
        Some(at) => format!("now at {}", place(engine, at)),
        None => "went nowhere".to_string(),
    };
    let others = outcome.moved.len().saturating_sub(1);
    if others > 0 {
        line.push_str(&format!(" with {others} other{}", plural(others)));
    }
    if outcome.sneaked {
        line.push_str(&format!(" {}", "(unseen)".dimmed()));
    }
    for (who, why) in &outcome.omitted {
        let note = format!("; {} stayed behind: {why}", name_of(engine, *who));
        line.push_str(&note.yellow().to_string());
    }
    for who in &outcome.died {
        let note = format!("; {} died", name_of(engine, *who));
        line.push_str(&note.red().to_string());
    }
    line
}

fn place(engine: &Engine, at: &Location) -> String {
    match engine.peek(at) {
        Some(room) if !room.name.is_empty() => format!("{at} ({})", room.name),
        _ => at.to_string(),
    }
}

fn name_of(engine: &Engine, id: ActorId) -> String {
    engine
        .world()
        .actor(id)
        .map_or_else(|| id.to_string(), |a| a.name.clone())
}

fn colorize_event(kind: &NavEventKind, description: &str) -> colored::ColoredString {
    match kind {
        NavEventKind::Died { .. } => description.red().bold(),
        NavEventKind::Fell { .. } | NavEventKind::WallDamage { .. } => description.red(),
        NavEventKind::LeftBehind { .. } | NavEventKind::SneakFailed { .. } => description.yellow(),
        NavEventKind::Departed { .. } | NavEventKind::Arrived { .. } => description.blue(),
        NavEventKind::TracksFound { .. } => description.green(),
        NavEventKind::PortalOpened { .. } | NavEventKind::PortalCollapsed { .. } => {
            description.magenta()
        }
        _ => description.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse() {
        assert_eq!(parse_step("north").unwrap(), Step::Go("north".into()));
        assert_eq!(parse_step("sneak:up").unwrap(), Step::Sneak("up".into()));
        assert_eq!(
            parse_step("@town:2").unwrap(),
            Step::Teleport(Location::symbolic("town", 2))
        );
        assert_eq!(
            parse_step("portal:wild.1.2").unwrap(),
            Step::Portal(Location::grid("wild", 1, 2, 0))
        );
        assert_eq!(parse_step("wait").unwrap(), Step::Wait(1));
        assert_eq!(parse_step("wait:3").unwrap(), Step::Wait(3));
        assert_eq!(parse_step("search").unwrap(), Step::Search);
    }

    #[test]
    fn bad_steps_are_rejected() {
        assert!(parse_step("dance:north").is_err());
        assert!(parse_step("wait:soon").is_err());
        assert!(parse_step("@nowhere").is_err());
    }
}
