#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pacific Command engine.
//!
//! This crate defines the map vocabulary (grid references and [`GridCell`]),
//! the mission taxonomy, the persisted flight path snapshot, and the message
//! surface that connects adapters with the authoritative world. Adapters submit
//! [`Command`] values, the world executes them via its `apply` entry point and
//! broadcasts [`Event`] values describing what happened.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

pub mod reference;

/// Errors raised while reading or resolving map references.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// The text does not follow the `letters` + `digits` grammar.
    #[error("invalid map reference '{reference}'")]
    InvalidReference {
        /// Offending text as supplied by the caller.
        reference: String,
    },
    /// The reference is well formed but lies outside the theater map.
    #[error("map reference '{reference}' lies outside the theater")]
    OffMap {
        /// Offending reference.
        reference: String,
    },
}

/// Raised when a mission-type tag has no registered flight path variant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MissionTypeError {
    /// No mission kind answers to the provided tag.
    #[error("unknown mission type '{tag}'")]
    UnknownMissionType {
        /// Tag that failed to resolve.
        tag: String,
    },
}

/// Errors raised while building or restoring a flight path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// One of the references could not be resolved.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    /// The persisted mission type tag is unknown.
    #[error(transparent)]
    MissionType(#[from] MissionTypeError),
    /// The route builder produced no cells between origin and target.
    #[error("route between '{origin}' and '{target}' contains no cells")]
    EmptyRoute {
        /// Origin reference requested by the caller.
        origin: String,
        /// Target reference requested by the caller.
        target: String,
    },
    /// A persisted cursor does not index into the persisted cells.
    #[error("cursor {cursor} is out of range for a path of {len} cells")]
    CursorOutOfRange {
        /// Persisted cursor value.
        cursor: i64,
        /// Number of persisted cells.
        len: usize,
    },
}

/// Reasons the world refuses to launch or restore a mission.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// The flight path could not be constructed.
    #[error(transparent)]
    Path(#[from] PathError),
    /// Missions must cover at least one cell per turn.
    #[error("mission speed must be at least one cell per turn")]
    ZeroSpeed,
    /// Restored missions need a path that has been started.
    #[error("restored flight path was never started")]
    UnsetPath,
    /// An outbound mission cannot sit beyond the target of its path.
    #[error("outbound mission restored at step {cursor}, past its target at step {target}")]
    PastTarget {
        /// Persisted cursor of the path.
        cursor: usize,
        /// Index of the target cell on the path.
        target: usize,
    },
}

/// A single map cell identified by its zero-based row and column.
///
/// The textual reference is computed once on construction. Equality, hashing
/// and ordering only look at `(row, column)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCell {
    row: u32,
    column: u32,
    reference: String,
}

impl GridCell {
    /// Creates a cell from zero-based indices.
    #[must_use]
    pub fn new(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            reference: reference::format(row, column),
        }
    }

    /// Parses a cell from a map reference such as `G20`.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let (row, column) = reference::parse(text)?;
        Ok(Self::new(row, column))
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Canonical map reference of the cell.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl Eq for GridCell {}

impl Hash for GridCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.column.hash(state);
    }
}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCell {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.column).cmp(&(other.row, other.column))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl FromStr for GridCell {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GridCell {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GridCell> for String {
    fn from(cell: GridCell) -> Self {
        cell.reference
    }
}

/// Produces straight routes across the map.
pub trait RouteBuilder {
    /// Returns the ordered cells from `origin` to `target`, both inclusive.
    fn straight_path(&self, origin: &str, target: &str) -> Result<Vec<GridCell>, ReferenceError>;

    /// Resolves a reference to a cell on the map, if it exists.
    fn cell_by_reference(&self, reference: &str) -> Option<GridCell>;
}

/// Predicate over an externally owned mission state.
///
/// Flight paths only need to know whether the owning mission is still flying
/// its outbound leg.
pub trait MissionPhase {
    /// Reports whether the mission is on its outbound leg.
    fn is_outbound(&self) -> bool;
}

/// Progress of a mission through its sortie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionState {
    /// Flying from the origin toward the target.
    OutBound,
    /// Holding over the target for the current turn.
    OverTarget,
    /// Flying home, either after the target or after a recall.
    InBound,
    /// The flight path has been fully flown or ended.
    Complete,
}

impl MissionPhase for MissionState {
    fn is_outbound(&self) -> bool {
        *self == Self::OutBound
    }
}

/// Shape of the route a mission flies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Origin to target and stop there.
    OneWay,
    /// Origin to target and back along the same cells.
    RoundTrip,
}

/// Air mission types understood by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MissionKind {
    /// Attack on enemy ships at sea.
    NavalStrike,
    /// Attack on a land target.
    LandStrike,
    /// Attack on shipping moored in a port.
    PortStrike,
    /// Attack on an enemy airfield.
    AirfieldStrike,
    /// Reconnaissance sweep looking for enemy task forces.
    Search,
    /// Standing patrol over a sea area.
    Patrol,
    /// Combat air patrol over a distant friendly force.
    DistantCap,
    /// Ferry flight delivering aircraft to another base.
    Ferry,
    /// Permanent rebasing of a squadron.
    Transfer,
}

impl MissionKind {
    /// Every mission kind in tag order.
    pub const ALL: [Self; 9] = [
        Self::NavalStrike,
        Self::LandStrike,
        Self::PortStrike,
        Self::AirfieldStrike,
        Self::Search,
        Self::Patrol,
        Self::DistantCap,
        Self::Ferry,
        Self::Transfer,
    ];

    /// Tag used for this kind in persisted data and scenario files.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::NavalStrike => "naval-strike",
            Self::LandStrike => "land-strike",
            Self::PortStrike => "port-strike",
            Self::AirfieldStrike => "airfield-strike",
            Self::Search => "search",
            Self::Patrol => "patrol",
            Self::DistantCap => "distant-cap",
            Self::Ferry => "ferry",
            Self::Transfer => "transfer",
        }
    }

    /// Resolves a tag, ignoring case and surrounding whitespace.
    pub fn from_tag(tag: &str) -> Result<Self, MissionTypeError> {
        let wanted = tag.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MissionTypeError::UnknownMissionType {
                tag: tag.to_owned(),
            })
    }

    /// Flight path variant flown by this kind of mission.
    ///
    /// Ferry and transfer flights end at their destination, everything else
    /// returns to its origin.
    #[must_use]
    pub const fn path_kind(self) -> PathKind {
        match self {
            Self::Ferry | Self::Transfer => PathKind::OneWay,
            Self::NavalStrike
            | Self::LandStrike
            | Self::PortStrike
            | Self::AirfieldStrike
            | Self::Search
            | Self::Patrol
            | Self::DistantCap => PathKind::RoundTrip,
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MissionKind {
    type Err = MissionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Serializable snapshot of a flight path.
///
/// Restoring from this data never consults a route builder; the cells are
/// stored as references and the cursor is `-1` for a path that never started.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathData {
    /// Map references of every cell on the path, in flight order.
    pub cells: Vec<String>,
    /// Index of the cell the mission currently occupies, `-1` when unset.
    pub cursor: i64,
    /// Tag of the mission kind that owns the path.
    pub mission_type_tag: String,
}

/// Unique identifier assigned to a mission by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissionId(u32);

impl MissionId {
    /// Creates a new mission identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable representation of a single mission used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissionSnapshot {
    /// Identifier assigned to the mission.
    pub id: MissionId,
    /// Type of the mission.
    pub kind: MissionKind,
    /// Current progress through the sortie.
    pub state: MissionState,
    /// Cells covered per turn.
    pub speed: u32,
    /// Cell the mission occupies.
    pub cell: GridCell,
    /// Cells left before the mission finishes its current path.
    pub distance_to_end: usize,
    /// Persistable copy of the flight path.
    pub path: PathData,
}

/// Read-only snapshot describing every mission known to the world.
#[derive(Clone, Debug, Default)]
pub struct MissionView {
    snapshots: Vec<MissionSnapshot>,
}

impl MissionView {
    /// Creates a new mission view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MissionSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mission snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &MissionSnapshot> {
        self.snapshots.iter()
    }

    /// Number of missions captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no missions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the bounds of the theater map.
    ConfigureTheater {
        /// Number of map rows.
        rows: u32,
        /// Number of map columns.
        columns: u32,
    },
    /// Launches a new mission from `origin` toward `target`.
    LaunchMission {
        /// Type of mission being flown.
        kind: MissionKind,
        /// Reference of the base the mission departs from.
        origin: String,
        /// Reference of the mission target.
        target: String,
        /// Cells covered per turn.
        speed: u32,
    },
    /// Restores a mission from a persisted flight path.
    RestoreMission {
        /// Persisted path including the mission type tag.
        data: PathData,
        /// State the mission was in when saved.
        state: MissionState,
        /// Cells covered per turn.
        speed: u32,
    },
    /// Orders a mission to abandon its outbound leg and fly home.
    RecallMission {
        /// Identifier of the mission being recalled.
        mission: MissionId,
    },
    /// Forces a mission to the end of its current path.
    EndMission {
        /// Identifier of the mission being ended.
        mission: MissionId,
    },
    /// Advances every active mission by one turn.
    AdvanceTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The theater bounds changed.
    TheaterConfigured {
        /// Number of map rows.
        rows: u32,
        /// Number of map columns.
        columns: u32,
    },
    /// A mission took off and owns a fresh flight path.
    MissionLaunched {
        /// Identifier assigned to the mission.
        mission: MissionId,
        /// Type of the mission.
        kind: MissionKind,
        /// Number of cells on the full flight path.
        path_length: usize,
    },
    /// A mission was rebuilt from persisted data.
    MissionRestored {
        /// Identifier assigned to the mission.
        mission: MissionId,
        /// Type of the mission.
        kind: MissionKind,
        /// Cell the mission occupies.
        cell: GridCell,
    },
    /// A launch or restore request was refused.
    MissionRejected {
        /// Reason the mission could not be created.
        reason: LaunchError,
    },
    /// The turn counter advanced.
    TurnAdvanced {
        /// Number of the turn that just started.
        turn: u32,
    },
    /// A mission moved during the turn.
    MissionMoved {
        /// Identifier of the mission.
        mission: MissionId,
        /// Cells crossed this turn, starting with the cell it left.
        segment: Vec<GridCell>,
    },
    /// A mission reached its target cell.
    MissionOverTarget {
        /// Identifier of the mission.
        mission: MissionId,
        /// Target cell.
        cell: GridCell,
    },
    /// A mission turned for home before reaching its target.
    MissionRecalled {
        /// Identifier of the mission.
        mission: MissionId,
        /// Cell where the mission turned around.
        cell: GridCell,
    },
    /// A recall arrived after the mission had left its outbound leg.
    RecallIgnored {
        /// Identifier of the mission.
        mission: MissionId,
        /// State that prevented the recall.
        state: MissionState,
    },
    /// A mission flew its whole path.
    MissionCompleted {
        /// Identifier of the mission.
        mission: MissionId,
        /// Final cell of the path.
        cell: GridCell,
    },
    /// A mission was forced to the end of its path.
    MissionEnded {
        /// Identifier of the mission.
        mission: MissionId,
        /// Final cell of the path.
        cell: GridCell,
    },
    /// A command referred to a mission the world does not know.
    MissionNotFound {
        /// Identifier supplied with the command.
        mission: MissionId,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cells_from_equivalent_references_are_equal() {
        let upper = GridCell::parse("AA14").expect("valid reference");
        let lower = GridCell::parse("  aa14 ").expect("valid reference");
        let indexed = GridCell::new(13, 26);

        assert_eq!(upper, lower);
        assert_eq!(upper, indexed);
        assert_eq!(lower.reference(), "AA14");

        let set: HashSet<_> = [upper, lower, indexed].into_iter().collect();
        assert_eq!(set.len(), 1, "hash must agree with equality");
    }

    #[test]
    fn cell_exposes_indices_and_reference() {
        let cell: GridCell = "G20".parse().expect("valid reference");
        assert_eq!(cell.row(), 19);
        assert_eq!(cell.column(), 6);
        assert_eq!(cell.to_string(), "G20");
    }

    #[test]
    fn cells_order_row_major() {
        let mut cells = vec![GridCell::new(1, 0), GridCell::new(0, 5), GridCell::new(0, 1)];
        cells.sort();
        assert_eq!(
            cells,
            vec![GridCell::new(0, 1), GridCell::new(0, 5), GridCell::new(1, 0)]
        );
    }

    #[test]
    fn cell_serializes_as_reference() {
        let cell = GridCell::new(19, 6);
        let json = serde_json::to_string(&cell).expect("serialize");
        assert_eq!(json, "\"G20\"");

        let restored: GridCell = serde_json::from_str("\"g20\"").expect("deserialize");
        assert_eq!(restored, cell);
        assert!(serde_json::from_str::<GridCell>("\"20G\"").is_err());
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&GridCell::new(3, 27));
    }

    #[test]
    fn path_data_round_trips_through_bincode() {
        assert_round_trip(&PathData {
            cells: vec!["A1".to_owned(), "A2".to_owned(), "A1".to_owned()],
            cursor: 1,
            mission_type_tag: MissionKind::Search.tag().to_owned(),
        });
    }

    #[test]
    fn mission_tags_resolve_to_their_kind() {
        for kind in MissionKind::ALL {
            assert_eq!(MissionKind::from_tag(kind.tag()), Ok(kind));
        }
        assert_eq!(
            " Naval-Strike ".parse::<MissionKind>(),
            Ok(MissionKind::NavalStrike)
        );
    }

    #[test]
    fn unknown_mission_tag_is_rejected() {
        assert_eq!(
            MissionKind::from_tag("kamikaze"),
            Err(MissionTypeError::UnknownMissionType {
                tag: "kamikaze".to_owned(),
            })
        );
    }

    #[test]
    fn only_ferry_flights_are_one_way() {
        let one_way: Vec<_> = MissionKind::ALL
            .into_iter()
            .filter(|kind| kind.path_kind() == PathKind::OneWay)
            .collect();
        assert_eq!(one_way, vec![MissionKind::Ferry, MissionKind::Transfer]);
    }

    #[test]
    fn only_outbound_state_is_outbound() {
        assert!(MissionState::OutBound.is_outbound());
        assert!(!MissionState::OverTarget.is_outbound());
        assert!(!MissionState::InBound.is_outbound());
        assert!(!MissionState::Complete.is_outbound());
    }

    #[test]
    fn path_errors_describe_the_offending_value() {
        let error = PathError::from(ReferenceError::InvalidReference {
            reference: "1A".to_owned(),
        });
        assert_eq!(error.to_string(), "invalid map reference '1A'");

        let error = LaunchError::from(PathError::from(MissionTypeError::UnknownMissionType {
            tag: "bomb".to_owned(),
        }));
        assert_eq!(error.to_string(), "unknown mission type 'bomb'");

        let error = LaunchError::PastTarget {
            cursor: 3,
            target: 2,
        };
        assert_eq!(
            error.to_string(),
            "outbound mission restored at step 3, past its target at step 2"
        );
    }
}
