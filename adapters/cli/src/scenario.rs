//! Scenario files describing a batch of air missions to simulate.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use pacific_command_core::{Command, Event, MissionId, MissionKind, MissionView};
use pacific_command_world::{self as world, query, World};
use serde::Deserialize;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Parsed contents of a scenario file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    version: u32,
    #[serde(default)]
    theater: Option<TheaterConfig>,
    #[serde(default)]
    missions: Vec<MissionPlan>,
}

/// Bounds of the theater map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TheaterConfig {
    rows: u32,
    columns: u32,
}

/// A single mission to launch at the start of the scenario.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MissionPlan {
    mission: String,
    origin: String,
    target: String,
    speed: u32,
    #[serde(default)]
    recall_on_turn: Option<u32>,
    #[serde(default)]
    end_on_turn: Option<u32>,
}

/// Outcome of running a scenario.
#[derive(Debug)]
pub(crate) struct SimulationReport {
    /// Number of turns that were processed.
    pub(crate) turns: u32,
    /// Every event emitted by the world, in order.
    pub(crate) events: Vec<Event>,
    /// Scenario entries that could not be launched, with the reason.
    pub(crate) skipped: Vec<(usize, String)>,
    /// Final state of every launched mission.
    pub(crate) missions: MissionView,
}

impl Scenario {
    /// Loads and validates the scenario at the provided path.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario at {}", path.display()))
    }

    /// Parses and validates scenario toml contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        if scenario.version != SUPPORTED_SCENARIO_VERSION {
            bail!(
                "unsupported scenario version {}; expected {}",
                scenario.version,
                SUPPORTED_SCENARIO_VERSION
            );
        }
        Ok(scenario)
    }

    /// Launches every mission and advances turns until all of them are done
    /// or `max_turns` is reached.
    ///
    /// Entries that fail to launch are logged and skipped; the rest of the
    /// scenario still runs.
    pub(crate) fn run(&self, max_turns: u32) -> SimulationReport {
        let mut world = World::new();
        let mut events = Vec::new();
        let mut skipped = Vec::new();

        if let Some(theater) = self.theater {
            world::apply(
                &mut world,
                Command::ConfigureTheater {
                    rows: theater.rows,
                    columns: theater.columns,
                },
                &mut events,
            );
        }

        let mut scheduled: BTreeMap<u32, Vec<Command>> = BTreeMap::new();
        for (index, plan) in self.missions.iter().enumerate() {
            match launch(&mut world, plan, &mut events) {
                Ok(mission) => {
                    if let Some(turn) = plan.recall_on_turn {
                        scheduled
                            .entry(turn)
                            .or_default()
                            .push(Command::RecallMission { mission });
                    }
                    if let Some(turn) = plan.end_on_turn {
                        scheduled
                            .entry(turn)
                            .or_default()
                            .push(Command::EndMission { mission });
                    }
                }
                Err(reason) => {
                    log::warn!("skipping scenario mission {index}: {reason}");
                    skipped.push((index, reason));
                }
            }
        }

        let mut turns = 0;
        while turns < max_turns && query::has_active_missions(&world) {
            turns += 1;
            for command in scheduled.remove(&turns).unwrap_or_default() {
                world::apply(&mut world, command, &mut events);
            }
            world::apply(&mut world, Command::AdvanceTurn, &mut events);
        }

        SimulationReport {
            turns,
            events,
            skipped,
            missions: query::mission_view(&world),
        }
    }
}

fn launch(
    world: &mut World,
    plan: &MissionPlan,
    events: &mut Vec<Event>,
) -> std::result::Result<MissionId, String> {
    let kind = MissionKind::from_tag(&plan.mission).map_err(|error| error.to_string())?;

    let first_new = events.len();
    world::apply(
        world,
        Command::LaunchMission {
            kind,
            origin: plan.origin.clone(),
            target: plan.target.clone(),
            speed: plan.speed,
        },
        events,
    );

    match events.get(first_new) {
        Some(Event::MissionLaunched { mission, .. }) => Ok(*mission),
        Some(Event::MissionRejected { reason }) => Err(reason.to_string()),
        other => Err(format!("unexpected launch outcome {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use pacific_command_core::MissionState;

    use super::*;

    const STRIKE_AND_FERRY: &str = r#"
        version = 1

        [theater]
        rows = 20
        columns = 20

        [[missions]]
        mission = "naval-strike"
        origin = "A1"
        target = "A5"
        speed = 2

        [[missions]]
        mission = "ferry"
        origin = "C3"
        target = "F6"
        speed = 1
    "#;

    #[test]
    fn parse_reads_theater_and_missions() {
        let scenario = Scenario::parse(STRIKE_AND_FERRY).expect("scenario parses");
        assert_eq!(
            scenario.theater,
            Some(TheaterConfig {
                rows: 20,
                columns: 20,
            })
        );
        assert_eq!(scenario.missions.len(), 2);
        assert_eq!(scenario.missions[1].mission, "ferry");
        assert_eq!(scenario.missions[1].recall_on_turn, None);
    }

    #[test]
    fn parse_rejects_unsupported_versions() {
        let error = Scenario::parse("version = 2").expect_err("version 2 is unknown");
        assert!(error.to_string().contains("unsupported scenario version 2"));
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let contents = r#"
            version = 1

            [[missions]]
            mission = "search"
            origin = "A1"
            target = "A5"
            speed = 2
            altitude = 12000
        "#;
        assert!(Scenario::parse(contents).is_err());
    }

    #[test]
    fn run_flies_every_mission_to_completion() {
        let scenario = Scenario::parse(STRIKE_AND_FERRY).expect("scenario parses");
        let report = scenario.run(50);

        assert!(report.skipped.is_empty());
        assert_eq!(report.turns, 4);
        assert_eq!(report.missions.len(), 2);
        assert!(report
            .missions
            .iter()
            .all(|mission| mission.state == MissionState::Complete));
    }

    #[test]
    fn run_skips_invalid_entries_and_keeps_going() {
        let contents = r#"
            version = 1

            [[missions]]
            mission = "kamikaze"
            origin = "A1"
            target = "A5"
            speed = 2

            [[missions]]
            mission = "search"
            origin = "A1"
            target = "5A"
            speed = 2

            [[missions]]
            mission = "search"
            origin = "B1"
            target = "B3"
            speed = 2
        "#;
        let report = Scenario::parse(contents).expect("scenario parses").run(10);

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].0, 0);
        assert!(report.skipped[0].1.contains("kamikaze"));
        assert_eq!(report.skipped[1].0, 1);
        assert!(report.skipped[1].1.contains("5A"));
        assert_eq!(report.missions.len(), 1);
    }

    #[test]
    fn run_applies_scheduled_recalls_before_moving() {
        let contents = r#"
            version = 1

            [[missions]]
            mission = "land-strike"
            origin = "A1"
            target = "A9"
            speed = 2
            recall_on_turn = 3
        "#;
        let report = Scenario::parse(contents).expect("scenario parses").run(10);

        let recalled = report.events.iter().find_map(|event| match event {
            Event::MissionRecalled { cell, .. } => Some(cell.reference().to_owned()),
            _ => None,
        });
        assert_eq!(recalled.as_deref(), Some("A5"));
        assert_eq!(report.turns, 4);
    }

    #[test]
    fn run_stops_at_the_turn_limit() {
        let contents = r#"
            version = 1

            [[missions]]
            mission = "patrol"
            origin = "A1"
            target = "A30"
            speed = 1
        "#;
        let report = Scenario::parse(contents).expect("scenario parses").run(3);

        assert_eq!(report.turns, 3);
        let mission = report.missions.iter().next().expect("mission launched");
        assert_eq!(mission.state, MissionState::OutBound);
        assert_eq!(mission.cell.reference(), "A4");
    }
}
