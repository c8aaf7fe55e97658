use crate::constants::{
    CELLS_PER_ROOM, FLOOR_GLYPH, MAX_ROOM_SIZE, MIN_ROOM_SIZE, VALID_POSITION_ATTEMPTS,
};
use crate::rng::Rng;
use crate::types::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }

    /// Rectangle overlap with a one-cell buffer around both rooms.
    pub fn overlaps(&self, other: &Room) -> bool {
        self.x < other.x + other.width + 1
            && self.x + self.width + 1 > other.x
            && self.y < other.y + other.height + 1
            && self.y + self.height + 1 > other.y
    }
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub cols: i32,
    pub rows: i32,
    pub wall: char,
    pub rooms: Vec<Room>,
    tiles: Vec<Vec<char>>,
}

pub fn generate_maze(cols: i32, rows: i32, wall: char, rng: &mut Rng) -> Maze {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let mut maze = Maze {
        cols,
        rows,
        wall,
        rooms: Vec::new(),
        tiles: vec![vec![wall; cols as usize]; rows as usize],
    };

    let max_rooms = (cols * rows) / CELLS_PER_ROOM;
    for _ in 0..max_rooms {
        let width = rng.int(MIN_ROOM_SIZE, MAX_ROOM_SIZE);
        let height = rng.int(MIN_ROOM_SIZE, MAX_ROOM_SIZE);
        let x = rng.int(1, cols - width - 1);
        let y = rng.int(1, rows - height - 1);
        let room = Room {
            x,
            y,
            width,
            height,
        };
        if maze.rooms.iter().any(|other| room.overlaps(other)) {
            continue;
        }
        maze.carve_room(&room);
        maze.rooms.push(room);
    }

    if maze.rooms.len() >= 2 {
        for idx in 0..maze.rooms.len() - 1 {
            let from = maze.rooms[idx].center();
            let to = maze.rooms[idx + 1].center();
            maze.carve_corridor(from, to, rng);
        }

        let extra_connections = maze.rooms.len() / 3;
        for _ in 0..extra_connections {
            let a = rng.int(0, maze.rooms.len() as i32 - 1) as usize;
            let b = rng.int(0, maze.rooms.len() as i32 - 1) as usize;
            if a == b {
                continue;
            }
            let (Some(room_a), Some(room_b)) = (maze.rooms.get(a), maze.rooms.get(b)) else {
                continue;
            };
            let (from, to) = (room_a.center(), room_b.center());
            maze.carve_corridor(from, to, rng);
        }
    }

    maze
}

impl Maze {
    /// Builds a maze from ASCII rows. Border cells are forced to walls.
    pub fn from_rows(rows: &[&str], wall: char) -> Self {
        let height = rows.len().max(1) as i32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(1).max(1) as i32;
        let mut tiles = vec![vec![wall; width as usize]; height as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let on_border =
                    x == 0 || y == 0 || x as i32 == width - 1 || y as i32 == height - 1;
                tiles[y][x] = if on_border || ch == wall {
                    wall
                } else {
                    FLOOR_GLYPH
                };
            }
        }
        Self {
            cols: width,
            rows: height,
            wall,
            rooms: Vec::new(),
            tiles,
        }
    }

    /// An open arena: walls on the border, floor everywhere else.
    pub fn open(cols: i32, rows: i32, wall: char) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut tiles = vec![vec![wall; cols as usize]; rows as usize];
        for y in 1..(rows - 1).max(1) {
            for x in 1..(cols - 1).max(1) {
                tiles[y as usize][x as usize] = FLOOR_GLYPH;
            }
        }
        Self {
            cols,
            rows,
            wall,
            rooms: Vec::new(),
            tiles,
        }
    }

    pub fn tiles(&self) -> &[Vec<char>] {
        &self.tiles
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.cols && y < self.rows
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<char> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map(|c| c == self.wall).unwrap_or(true)
    }

    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        !self.is_wall(x, y)
    }

    pub fn floor_count(&self) -> usize {
        self.tiles
            .iter()
            .flatten()
            .filter(|c| **c != self.wall)
            .count()
    }

    pub fn find_valid_position(&self, rng: &mut Rng) -> Vec2 {
        for _ in 0..VALID_POSITION_ATTEMPTS {
            let x = rng.int(1, self.cols - 2);
            let y = rng.int(1, self.rows - 2);
            if self.is_floor(x, y) {
                return Vec2 { x, y };
            }
        }
        for y in 1..self.rows - 1 {
            for x in 1..self.cols - 1 {
                if self.is_floor(x, y) {
                    return Vec2 { x, y };
                }
            }
        }
        Vec2 { x: 1, y: 1 }
    }

    fn carve(&mut self, x: i32, y: i32) {
        if x > 0 && x < self.cols - 1 && y > 0 && y < self.rows - 1 {
            self.tiles[y as usize][x as usize] = FLOOR_GLYPH;
        }
    }

    fn carve_room(&mut self, room: &Room) {
        for y in room.y..room.y + room.height {
            for x in room.x..room.x + room.width {
                self.carve(x, y);
            }
        }
    }

    fn carve_corridor(&mut self, from: Vec2, to: Vec2, rng: &mut Rng) {
        if rng.chance(0.5) {
            self.carve_horizontal(from.x, to.x, from.y);
            self.carve_vertical(from.y, to.y, to.x);
        } else {
            self.carve_vertical(from.y, to.y, from.x);
            self.carve_horizontal(from.x, to.x, to.y);
        }
    }

    fn carve_horizontal(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.carve(x, y);
        }
    }

    fn carve_vertical(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.carve(x, y);
        }
    }
}
