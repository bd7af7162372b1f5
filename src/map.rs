//! The maze grid and its sliding doors.
//!
//! Cells are `0` (passable) or a positive wall value selecting a texture
//! variant. The generated maze is always fully enclosed by boundary walls,
//! which is what keeps the DDA loop from ever leaving the grid. Doors are
//! the one mutable part of the map: each carries a small state machine
//! (`closed → opening → open → closing → closed`) driven once per frame by
//! [`GridMap::update_doors`] and by the per-ray collision probe.

use crate::math::vec2::Vec2;
use crate::raycaster::Side;
use rand::Rng;

/// Offset at which a door counts as fully open.
pub const DOOR_OPEN_THRESHOLD: f32 = 0.95;
/// Offset units per second while a door slides open.
pub const DOOR_OPEN_RATE: f32 = 2.0;
/// Offset units per second while a door slides shut.
pub const DOOR_CLOSE_RATE: f32 = 1.0;

// The proximity band along the door's facing axis that triggers it.
const TRIGGER_BAND_BEFORE: f32 = 0.15;
const TRIGGER_BAND_AFTER: f32 = 1.15;

const DOOR_TARGET_COUNT: usize = 5;
const PLACEMENT_ATTEMPT_BUDGET: u32 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Which axis the door's corridor runs along, and therefore which axis the
/// player approaches it on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorSide {
    /// Approached along x: corridor runs east-west.
    Horizontal,
    /// Approached along y: corridor runs north-south.
    Vertical,
}

/// A sliding door. Plain data: all state transitions live in [`GridMap`].
#[derive(Clone, Debug)]
pub struct Door {
    pub position: (i32, i32),
    /// 0 = fully closed, 1 = fully open.
    pub offset: f32,
    pub state: DoorState,
    pub side: DoorSide,
    /// Set while the camera is in the proximity band; consumed by the next
    /// door update.
    pub trigger: bool,
    // Frame stamp so the per-ray probe advances `offset` once per frame no
    // matter how many rays step through the door cell.
    advanced_frame: u64,
}

impl Door {
    pub fn new(position: (i32, i32), side: DoorSide) -> Self {
        Self {
            position,
            offset: 0.0,
            state: DoorState::Closed,
            side,
            trigger: false,
            advanced_frame: 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MapError {
    /// The maze generator only handles square grids.
    NotSquare { width: usize, height: usize },
    /// The maze generator requires odd dimensions so walls fit between cells.
    EvenSize(usize),
    /// Cell array length does not match the dimensions.
    BadCellCount { expected: usize, actual: usize },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotSquare { width, height } => {
                write!(f, "map must be square, got {width}x{height}")
            }
            MapError::EvenSize(size) => write!(f, "map size must be odd, got {size}"),
            MapError::BadCellCount { expected, actual } => {
                write!(f, "expected {expected} cells, got {actual}")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// The world: an immutable cell grid plus its mutable doors.
#[derive(Debug)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    doors: Vec<Door>,
    frame: u64,
}

impl GridMap {
    /// Generates a maze with doors. Width and height must be equal and odd.
    pub fn new(width: usize, height: usize) -> Result<Self, MapError> {
        Self::with_rng(width, height, &mut rand::thread_rng())
    }

    /// Like [`GridMap::new`] with a caller-provided RNG, so generation can
    /// be made deterministic.
    pub fn with_rng<R: Rng>(width: usize, height: usize, rng: &mut R) -> Result<Self, MapError> {
        if width != height {
            return Err(MapError::NotSquare { width, height });
        }
        if height % 2 != 1 {
            return Err(MapError::EvenSize(height));
        }

        let cells = generate_maze(width, height, rng);
        let doors = generate_doors(&cells, width, height, rng);
        Ok(Self {
            width,
            height,
            cells,
            doors,
            frame: 0,
        })
    }

    /// Builds a map from explicit cell values (column x, row y, index
    /// `y * width + x`) with no doors. Used for hand-crafted layouts.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u8>) -> Result<Self, MapError> {
        if cells.len() != width * height {
            return Err(MapError::BadCellCount {
                expected: width * height,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
            doors: Vec::new(),
            frame: 0,
        })
    }

    pub fn add_door(&mut self, door: Door) {
        self.doors.push(door);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Cell value at integer grid coordinates. Coordinates outside the grid
    /// read as solid wall; legal maps are enclosed so rays never get there.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 1;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// Cell value at continuous map coordinates (truncated).
    #[inline]
    pub fn get_cell(&self, x: f32, y: f32) -> u8 {
        self.cell(x as i32, y as i32)
    }

    /// False while any triggered door has not finished opening. Movement is
    /// gated on this globally, not per door along the movement path.
    pub fn can_pass_through_all_doors(&self) -> bool {
        !self
            .doors
            .iter()
            .any(|door| door.trigger && door.state != DoorState::Open)
    }

    /// Per-frame door bookkeeping: consumes triggers and slides untriggered
    /// doors shut.
    pub fn update_doors(&mut self, delta_time: f32) {
        self.frame += 1;
        for door in &mut self.doors {
            if door.trigger {
                door.trigger = false;
            } else {
                if matches!(door.state, DoorState::Open | DoorState::Opening) {
                    door.state = DoorState::Closing;
                }
                if door.offset > 0.0 && door.state == DoorState::Closing {
                    door.offset -= delta_time * DOOR_CLOSE_RATE;
                }
                if door.offset <= 0.0 {
                    door.state = DoorState::Closed;
                    door.offset = 0.0;
                }
            }
        }
    }

    /// Door probe called once per DDA step from the raycaster.
    ///
    /// Three jobs: (a) trigger any door whose proximity band contains the
    /// camera, so doors sense the player without a ray having to hit them;
    /// (b) sub-cell hit test against the sliding panel when the current DDA
    /// cell is a door cell; (c) advance the opening animation of triggered
    /// doors. Returns the index of the door blocking this ray, if any.
    #[allow(clippy::too_many_arguments)]
    pub fn probe_door_collision(
        &mut self,
        position: Vec2,
        side: Side,
        side_distance: Vec2,
        delta_distance: Vec2,
        ray_direction: Vec2,
        map_coords: (i32, i32),
        delta_time: f32,
    ) -> Option<usize> {
        let mut selected = None;

        for index in 0..self.doors.len() {
            let frame = self.frame;
            let door = &mut self.doors[index];
            let door_x = door.position.0 as f32;
            let door_y = door.position.1 as f32;

            match door.side {
                DoorSide::Horizontal => {
                    if position.x < door_x + TRIGGER_BAND_AFTER
                        && position.x > door_x - TRIGGER_BAND_BEFORE
                        && position.y as i32 == door.position.1
                    {
                        door.trigger = true;
                    }
                }
                DoorSide::Vertical => {
                    if position.y < door_y + TRIGGER_BAND_AFTER
                        && position.y > door_y - TRIGGER_BAND_BEFORE
                        && position.x as i32 == door.position.0
                    {
                        door.trigger = true;
                    }
                }
            }

            if door.position == map_coords && selected.is_none() {
                // The panel sits half a cell into the cell. Project the
                // ray's penetration point onto the sliding axis and test it
                // against the part of the panel not yet retracted into the
                // wall cavity.
                let blocked = match side {
                    Side::X => {
                        let door_distance = side_distance.x - delta_distance.x / 2.0;
                        let hit = position.y + door_distance * ray_direction.y;
                        let hit = hit - hit.floor();
                        side_distance.x - delta_distance.x / 2.0 < side_distance.y
                            && 1.0 - hit > door.offset
                    }
                    Side::Y => {
                        let door_distance = side_distance.y - delta_distance.y / 2.0;
                        let hit = position.x + door_distance * ray_direction.x;
                        let hit = hit - hit.floor();
                        side_distance.y - delta_distance.y / 2.0 < side_distance.x
                            && 1.0 - hit > door.offset
                    }
                };
                if blocked {
                    selected = Some(index);
                }
            }

            if door.trigger {
                if door.state != DoorState::Open {
                    door.state = DoorState::Opening;
                }
                if door.offset >= DOOR_OPEN_THRESHOLD {
                    door.state = DoorState::Open;
                }
            }

            if door.offset < DOOR_OPEN_THRESHOLD
                && door.state == DoorState::Opening
                && door.advanced_frame != frame
            {
                door.offset = (door.offset + delta_time * DOOR_OPEN_RATE).min(1.0);
                door.advanced_frame = frame;
            }
        }

        selected
    }
}

/// Binary-tree maze generation: start solid, carve every other cell, then
/// carve a random right or down passage from each. Cell (1,1) always carves
/// right so the spawn never faces a wall. The right-most and bottom-most
/// corridors are emptied to connect every area, and the outer boundary
/// stays solid.
fn generate_maze<R: Rng>(width: usize, height: usize, rng: &mut R) -> Vec<u8> {
    let mut cells = vec![1u8; width * height];

    for x in (1..width - 2).step_by(2) {
        for y in (1..height - 2).step_by(2) {
            cells[y * width + x] = 0;

            // Carve right from the spawn cell so the player never starts
            // facing a wall; otherwise pick right or down at random.
            let direction = if x == 1 && y == 1 {
                0
            } else {
                rng.gen_range(0..2)
            };
            if direction == 0 {
                cells[y * width + x + 1] = 0;
            } else {
                cells[(y + 1) * width + x] = 0;
            }
        }
    }

    for y in 1..height - 1 {
        cells[y * width + width - 2] = 0;
    }
    for x in 1..width - 1 {
        cells[(height - 2) * width + x] = 0;
    }

    cells
}

/// Randomly places up to five doors per orientation. A position is viable
/// when it sits on a straight corridor run (so the door is visible from a
/// distance), is flanked by walls it can slide into, and shares no
/// row/column with an existing door. An attempt budget keeps generation
/// terminating on maps with few viable spots.
fn generate_doors<R: Rng>(cells: &[u8], width: usize, height: usize, rng: &mut R) -> Vec<Door> {
    let at = |x: i32, y: i32| cells[y as usize * width + x as usize];
    let mut doors: Vec<Door> = Vec::new();

    let mut attempts = 0;
    while doors.len() < DOOR_TARGET_COUNT && attempts < PLACEMENT_ATTEMPT_BUDGET {
        let x = rng.gen_range(0..width as i32 - 3) + 1;
        let y = rng.gen_range(0..height as i32 - 2).max(5);

        let corridor = (0..5).all(|i| at(x, y - i) == 0);
        let flanked = at(x + 1, y) == 1 && at(x - 1, y) == 1;
        let distinct = doors.iter().all(|door| door.position.0 != x);

        if corridor && flanked && distinct {
            doors.push(Door::new((x, y), DoorSide::Vertical));
            attempts = 0;
        }
        attempts += 1;
    }

    attempts = 0;
    while doors.len() < DOOR_TARGET_COUNT * 2 && attempts < PLACEMENT_ATTEMPT_BUDGET {
        let x = rng.gen_range(0..width as i32 - 2).max(5);
        let y = rng.gen_range(0..height as i32 - 3) + 1;

        let corridor = (0..5).all(|i| at(x - i, y) == 0);
        let flanked = at(x, y + 1) == 1 && at(x, y - 1) == 1;
        let distinct = doors.iter().all(|door| door.position.1 != y);

        if corridor && flanked && distinct {
            doors.push(Door::new((x, y), DoorSide::Horizontal));
            attempts = 0;
        }
        attempts += 1;
    }

    doors
}
