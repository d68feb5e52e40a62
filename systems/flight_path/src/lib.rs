#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based flight paths for air missions.
//!
//! A [`FlightPath`] owns the full route of a mission and a cursor marking the
//! cell the mission currently occupies. The route is laid out once when the
//! mission starts: one-way paths follow the straight line from origin to
//! target, round-trip paths append the same line in reverse so the target sits
//! in the middle. Every later operation (`progress`, `recall`, `end` and the
//! distance queries) works the same way for both shapes.

use pacific_command_core::{
    GridCell, MissionKind, MissionPhase, PathData, PathError, PathKind, RouteBuilder,
};

/// Route flown by a single mission together with its progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightPath {
    mission: MissionKind,
    cells: Vec<GridCell>,
    cursor: Option<usize>,
    last_segment: Vec<GridCell>,
}

impl FlightPath {
    /// Creates an unset path owned by a mission of the provided kind.
    ///
    /// The mission kind fixes the shape the route is laid out with.
    #[must_use]
    pub const fn new(mission: MissionKind) -> Self {
        Self {
            mission,
            cells: Vec::new(),
            cursor: None,
            last_segment: Vec::new(),
        }
    }

    /// Rebuilds a path from persisted data without consulting a route builder.
    ///
    /// The mission kind is resolved from the persisted tag and determines the
    /// path shape. A cursor of `-1` restores an unset path and is only accepted
    /// together with an empty cell list.
    pub fn from_data(data: &PathData) -> Result<Self, PathError> {
        let mission = MissionKind::from_tag(&data.mission_type_tag)?;
        let cells = data
            .cells
            .iter()
            .map(|reference| GridCell::parse(reference))
            .collect::<Result<Vec<_>, _>>()?;

        let out_of_range = || PathError::CursorOutOfRange {
            cursor: data.cursor,
            len: cells.len(),
        };
        let cursor = match data.cursor {
            -1 if cells.is_empty() => None,
            value => {
                let index = usize::try_from(value).map_err(|_| out_of_range())?;
                if index >= cells.len() {
                    return Err(out_of_range());
                }
                Some(index)
            }
        };

        Ok(Self {
            mission,
            cells,
            cursor,
            last_segment: Vec::new(),
        })
    }

    /// Lays out the route from `origin` to `target` and places the mission on
    /// its first cell.
    ///
    /// The builder is asked for the straight line between the references. A
    /// round trip mirrors that line back to the origin, sharing the target
    /// cell. On error the path keeps its previous contents.
    pub fn start<B>(&mut self, origin: &str, target: &str, builder: &B) -> Result<(), PathError>
    where
        B: RouteBuilder + ?Sized,
    {
        let outbound = builder.straight_path(origin, target)?;
        if outbound.is_empty() {
            return Err(PathError::EmptyRoute {
                origin: origin.to_owned(),
                target: target.to_owned(),
            });
        }

        self.cells = lay_out(self.kind(), outbound);
        self.cursor = Some(0);
        self.last_segment.clear();

        log::debug!(
            "started {} flight path {origin} -> {target} over {} cells",
            self.mission,
            self.cells.len()
        );
        Ok(())
    }

    /// Advances the mission by up to `distance` cells and returns the cells
    /// crossed, including the one it left and the one it reached.
    ///
    /// Movement past the final cell is clamped.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    pub fn progress(&mut self, distance: usize) -> &[GridCell] {
        let cursor = self.started_cursor("progress");
        let last = self.cells.len() - 1;
        let next = cursor.saturating_add(distance).min(last);

        self.last_segment.clear();
        self.last_segment.extend_from_slice(&self.cells[cursor..=next]);
        self.cursor = Some(next);

        log::trace!("flight path advanced from {cursor} to {next} of {last}");
        &self.last_segment
    }

    /// Turns an outbound mission for home along the cells it has already
    /// flown, returning whether the recall took effect.
    ///
    /// The new path runs from the current cell back to the origin and the
    /// cursor restarts at zero. Missions that are not outbound are left
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    pub fn recall<P>(&mut self, phase: &P) -> bool
    where
        P: MissionPhase + ?Sized,
    {
        let cursor = self.started_cursor("recall");
        if !phase.is_outbound() {
            log::debug!("recall ignored, mission is not outbound");
            return false;
        }

        self.cells.truncate(cursor + 1);
        self.cells.reverse();
        self.cursor = Some(0);
        self.last_segment.clear();

        log::debug!(
            "flight path recalled, {} cells back to {}",
            self.cells.len(),
            self.cells[self.cells.len() - 1]
        );
        true
    }

    /// Moves the mission onto the final cell of its path.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    pub fn end(&mut self) {
        let _ = self.started_cursor("end");
        self.cursor = Some(self.cells.len() - 1);
    }

    /// Number of cells left before the mission finishes its path.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    #[must_use]
    pub fn distance_to_end(&self) -> usize {
        let cursor = self.started_cursor("distance_to_end");
        self.cells.len() - 1 - cursor
    }

    /// Number of cells left before the mission reaches its target.
    ///
    /// Only meaningful while the mission still flies the path laid out by
    /// [`FlightPath::start`]; after a recall the whole path leads home.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    #[must_use]
    pub fn distance_to_target(&self) -> usize {
        let cursor = self.started_cursor("distance_to_target");
        self.target_index().saturating_sub(cursor)
    }

    /// Index of the target cell: the pivot of a round trip or the last cell of
    /// a one-way path.
    #[must_use]
    pub fn target_index(&self) -> usize {
        match self.kind() {
            PathKind::OneWay => self.cells.len().saturating_sub(1),
            PathKind::RoundTrip => self.cells.len() / 2,
        }
    }

    /// Reports whether the mission has reached or flown beyond its target.
    ///
    /// # Panics
    ///
    /// Panics if the path has not been started.
    #[must_use]
    pub fn has_passed_target(&self) -> bool {
        self.started_cursor("has_passed_target") >= self.target_index()
    }

    /// Serializes the path together with the tag of its owning mission.
    #[must_use]
    pub fn data(&self) -> PathData {
        PathData {
            cells: self
                .cells
                .iter()
                .map(|cell| cell.reference().to_owned())
                .collect(),
            cursor: self
                .cursor
                .and_then(|cursor| i64::try_from(cursor).ok())
                .unwrap_or(-1),
            mission_type_tag: self.mission.tag().to_owned(),
        }
    }

    /// Kind of the mission that owns the path.
    #[must_use]
    pub const fn mission(&self) -> MissionKind {
        self.mission
    }

    /// Shape the path is laid out with.
    #[must_use]
    pub const fn kind(&self) -> PathKind {
        self.mission.path_kind()
    }

    /// Every cell of the current path, in flight order.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Index of the occupied cell, or `None` before the path starts.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cell the mission currently occupies.
    #[must_use]
    pub fn current_cell(&self) -> Option<&GridCell> {
        self.cursor.and_then(|cursor| self.cells.get(cursor))
    }

    /// Cells crossed during the most recent call to [`FlightPath::progress`].
    #[must_use]
    pub fn last_segment(&self) -> &[GridCell] {
        &self.last_segment
    }

    /// Reports whether the path has been laid out.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.cursor.is_some()
    }

    /// Reports whether the mission sits on the final cell of its path.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor + 1 == self.cells.len())
    }

    fn started_cursor(&self, operation: &str) -> usize {
        match self.cursor {
            Some(cursor) => cursor,
            None => panic!("flight path must be started before calling {operation}"),
        }
    }
}

fn lay_out(kind: PathKind, mut outbound: Vec<GridCell>) -> Vec<GridCell> {
    match kind {
        PathKind::OneWay => outbound,
        PathKind::RoundTrip => {
            let inbound: Vec<_> = outbound.iter().rev().skip(1).cloned().collect();
            outbound.extend(inbound);
            outbound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_of(rows: std::ops::RangeInclusive<u32>) -> Vec<GridCell> {
        rows.map(|row| GridCell::new(row, 0)).collect()
    }

    #[test]
    fn one_way_lay_out_keeps_the_line() {
        let line = column_of(0..=3);
        assert_eq!(lay_out(PathKind::OneWay, line.clone()), line);
    }

    #[test]
    fn round_trip_lay_out_mirrors_around_the_target() {
        let cells = lay_out(PathKind::RoundTrip, column_of(0..=3));
        let rows: Vec<_> = cells.iter().map(GridCell::row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3, 2, 1, 0]);
    }

    #[test]
    fn round_trip_lay_out_of_single_cell_stays_single() {
        let cells = lay_out(PathKind::RoundTrip, column_of(4..=4));
        assert_eq!(cells, vec![GridCell::new(4, 0)]);
    }

    #[test]
    fn unset_path_serializes_with_negative_cursor() {
        let path = FlightPath::new(MissionKind::Ferry);
        let data = path.data();
        assert!(data.cells.is_empty());
        assert_eq!(data.cursor, -1);
        assert_eq!(data.mission_type_tag, "ferry");
        assert!(!path.is_started());
        assert!(path.current_cell().is_none());
    }

    #[test]
    #[should_panic(expected = "before calling progress")]
    fn progress_before_start_panics() {
        let mut path = FlightPath::new(MissionKind::Ferry);
        let _ = path.progress(1);
    }

    #[test]
    #[should_panic(expected = "before calling recall")]
    fn recall_before_start_panics() {
        let mut path = FlightPath::new(MissionKind::NavalStrike);
        let _ = path.recall(&pacific_command_core::MissionState::OutBound);
    }

    #[test]
    #[should_panic(expected = "before calling end")]
    fn end_before_start_panics() {
        FlightPath::new(MissionKind::Ferry).end();
    }

    #[test]
    #[should_panic(expected = "before calling distance_to_end")]
    fn distance_before_start_panics() {
        let _ = FlightPath::new(MissionKind::Ferry).distance_to_end();
    }
}
