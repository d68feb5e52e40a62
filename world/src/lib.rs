#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Pacific Command air operations.
//!
//! The world owns the theater map and every mission in flight. Callers mutate
//! it exclusively through [`apply`], one [`Command`] at a time, and learn about
//! the outcome through the [`Event`] values it appends. Read access goes
//! through the [`query`] module.

use std::collections::BTreeMap;

use pacific_command_core::{
    Command, Event, GridCell, LaunchError, MissionId, MissionKind, MissionPhase, MissionSnapshot,
    MissionState, PathData,
};
use pacific_command_system_flight_path::FlightPath;

mod theater;

pub use theater::{straight_line, TheaterMap};

const DEFAULT_THEATER_ROWS: u32 = 60;
const DEFAULT_THEATER_COLUMNS: u32 = 80;

/// Represents the authoritative Pacific Command world state.
#[derive(Debug)]
pub struct World {
    theater: TheaterMap,
    missions: BTreeMap<MissionId, Mission>,
    next_mission: u32,
    turn: u32,
}

impl World {
    /// Creates a new world with the default theater and no missions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theater: TheaterMap::new(DEFAULT_THEATER_ROWS, DEFAULT_THEATER_COLUMNS),
            missions: BTreeMap::new(),
            next_mission: 0,
            turn: 0,
        }
    }

    fn allocate_mission_id(&mut self) -> MissionId {
        let id = MissionId::new(self.next_mission);
        self.next_mission = self.next_mission.wrapping_add(1);
        id
    }

    fn insert_mission(&mut self, mission: Mission) {
        let _ = self.missions.insert(mission.id, mission);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Mission {
    id: MissionId,
    state: MissionState,
    speed: u32,
    path: FlightPath,
}

impl Mission {
    fn position(&self) -> GridCell {
        self.path
            .current_cell()
            .cloned()
            .expect("world missions always fly a started path")
    }

    fn fly(&mut self, out_events: &mut Vec<Event>) {
        let speed = usize::try_from(self.speed).unwrap_or(usize::MAX);
        match self.state {
            MissionState::Complete => {}
            MissionState::OutBound => {
                let step = speed.min(self.path.distance_to_target());
                self.advance(step, out_events);
                if self.path.distance_to_target() > 0 {
                    return;
                }
                if self.path.is_at_end() {
                    self.complete(out_events);
                } else {
                    self.state = MissionState::OverTarget;
                    out_events.push(Event::MissionOverTarget {
                        mission: self.id,
                        cell: self.position(),
                    });
                }
            }
            MissionState::OverTarget | MissionState::InBound => {
                self.state = MissionState::InBound;
                self.advance(speed, out_events);
                if self.path.distance_to_end() == 0 {
                    self.complete(out_events);
                }
            }
        }
    }

    fn advance(&mut self, distance: usize, out_events: &mut Vec<Event>) {
        let segment = self.path.progress(distance);
        if segment.len() > 1 {
            out_events.push(Event::MissionMoved {
                mission: self.id,
                segment: segment.to_vec(),
            });
        }
    }

    fn complete(&mut self, out_events: &mut Vec<Event>) {
        self.state = MissionState::Complete;
        log::info!("mission {} ({}) complete", self.id, self.path.mission());
        out_events.push(Event::MissionCompleted {
            mission: self.id,
            cell: self.position(),
        });
    }

    fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot {
            id: self.id,
            kind: self.path.mission(),
            state: self.state,
            speed: self.speed,
            cell: self.position(),
            distance_to_end: self.path.distance_to_end(),
            path: self.path.data(),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTheater { rows, columns } => {
            world.theater = TheaterMap::new(rows, columns);
            out_events.push(Event::TheaterConfigured { rows, columns });
        }
        Command::LaunchMission {
            kind,
            origin,
            target,
            speed,
        } => launch(world, kind, &origin, &target, speed, out_events),
        Command::RestoreMission { data, state, speed } => {
            restore(world, &data, state, speed, out_events);
        }
        Command::RecallMission { mission } => {
            let Some(entry) = world.missions.get_mut(&mission) else {
                out_events.push(Event::MissionNotFound { mission });
                return;
            };
            if entry.path.recall(&entry.state) {
                entry.state = MissionState::InBound;
                log::info!("mission {mission} recalled at {}", entry.position());
                out_events.push(Event::MissionRecalled {
                    mission,
                    cell: entry.position(),
                });
            } else {
                out_events.push(Event::RecallIgnored {
                    mission,
                    state: entry.state,
                });
            }
        }
        Command::EndMission { mission } => {
            let Some(entry) = world.missions.get_mut(&mission) else {
                out_events.push(Event::MissionNotFound { mission });
                return;
            };
            entry.path.end();
            entry.state = MissionState::Complete;
            out_events.push(Event::MissionEnded {
                mission,
                cell: entry.position(),
            });
        }
        Command::AdvanceTurn => {
            world.turn = world.turn.saturating_add(1);
            out_events.push(Event::TurnAdvanced { turn: world.turn });
            for mission in world.missions.values_mut() {
                mission.fly(out_events);
            }
        }
    }
}

fn launch(
    world: &mut World,
    kind: MissionKind,
    origin: &str,
    target: &str,
    speed: u32,
    out_events: &mut Vec<Event>,
) {
    if speed == 0 {
        reject(LaunchError::ZeroSpeed, out_events);
        return;
    }

    let mut path = FlightPath::new(kind);
    if let Err(error) = path.start(origin, target, &world.theater) {
        reject(error.into(), out_events);
        return;
    }

    let id = world.allocate_mission_id();
    log::info!(
        "mission {id} ({kind}) launched {origin} -> {target}, {} cells",
        path.cells().len()
    );
    out_events.push(Event::MissionLaunched {
        mission: id,
        kind,
        path_length: path.cells().len(),
    });
    world.insert_mission(Mission {
        id,
        state: MissionState::OutBound,
        speed,
        path,
    });
}

fn restore(
    world: &mut World,
    data: &PathData,
    state: MissionState,
    speed: u32,
    out_events: &mut Vec<Event>,
) {
    if speed == 0 {
        reject(LaunchError::ZeroSpeed, out_events);
        return;
    }

    let path = match FlightPath::from_data(data) {
        Ok(restored) => restored,
        Err(error) => {
            reject(error.into(), out_events);
            return;
        }
    };
    let Some(cursor) = path.cursor() else {
        reject(LaunchError::UnsetPath, out_events);
        return;
    };
    if state.is_outbound() && cursor > path.target_index() {
        let error = LaunchError::PastTarget {
            cursor,
            target: path.target_index(),
        };
        reject(error, out_events);
        return;
    }

    let kind = path.mission();
    let id = world.allocate_mission_id();
    let mission = Mission {
        id,
        state,
        speed,
        path,
    };
    out_events.push(Event::MissionRestored {
        mission: id,
        kind,
        cell: mission.position(),
    });
    world.insert_mission(mission);
}

fn reject(reason: LaunchError, out_events: &mut Vec<Event>) {
    log::warn!("mission rejected: {reason}");
    out_events.push(Event::MissionRejected { reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use pacific_command_core::{MissionId, MissionSnapshot, MissionState, MissionView};

    use super::{TheaterMap, World};

    /// Provides read-only access to the theater map.
    #[must_use]
    pub fn theater(world: &World) -> &TheaterMap {
        &world.theater
    }

    /// Number of turns processed so far.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Captures a snapshot of a single mission.
    #[must_use]
    pub fn mission(world: &World, id: MissionId) -> Option<MissionSnapshot> {
        world.missions.get(&id).map(super::Mission::snapshot)
    }

    /// Captures a read-only view of every mission.
    #[must_use]
    pub fn mission_view(world: &World) -> MissionView {
        MissionView::from_snapshots(
            world
                .missions
                .values()
                .map(super::Mission::snapshot)
                .collect(),
        )
    }

    /// Reports whether any mission is still flying.
    #[must_use]
    pub fn has_active_missions(world: &World) -> bool {
        world
            .missions
            .values()
            .any(|mission| mission.state != MissionState::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launched(world: &mut World, kind: MissionKind, origin: &str, target: &str) -> MissionId {
        let mut events = Vec::new();
        apply(
            world,
            Command::LaunchMission {
                kind,
                origin: origin.to_owned(),
                target: target.to_owned(),
                speed: 2,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::MissionLaunched { mission, .. }] => *mission,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn mission_ids_are_allocated_per_world() {
        let mut first = World::new();
        let mut second = World::new();

        let a = launched(&mut first, MissionKind::Search, "A1", "A5");
        let b = launched(&mut first, MissionKind::Search, "A1", "A5");
        let c = launched(&mut second, MissionKind::Search, "A1", "A5");

        assert_eq!(a, MissionId::new(0));
        assert_eq!(b, MissionId::new(1));
        assert_eq!(c, MissionId::new(0));
    }

    #[test]
    fn fresh_world_uses_the_default_theater() {
        let world = World::default();
        assert_eq!(query::turn(&world), 0);
        assert_eq!(
            *query::theater(&world),
            TheaterMap::new(DEFAULT_THEATER_ROWS, DEFAULT_THEATER_COLUMNS)
        );
        assert!(query::mission_view(&world).is_empty());
        assert!(!query::has_active_missions(&world));
    }

    #[test]
    fn single_cell_sortie_completes_on_first_turn() {
        let mut world = World::new();
        let id = launched(&mut world, MissionKind::Patrol, "C3", "C3");

        let mut events = Vec::new();
        apply(&mut world, Command::AdvanceTurn, &mut events);

        assert_eq!(
            events,
            vec![
                Event::TurnAdvanced { turn: 1 },
                Event::MissionCompleted {
                    mission: id,
                    cell: GridCell::new(2, 2),
                },
            ]
        );
        assert!(!query::has_active_missions(&world));
    }
}
