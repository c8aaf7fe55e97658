use crate::entity::Entity;
use crate::maze::Maze;
use crate::types::{EntityId, EntityKind, Vec2};

/// Read-only spatial queries used by movement and pathfinding.
pub trait GridQuery {
    fn cols(&self) -> i32;
    fn rows(&self) -> i32;
    fn is_wall(&self, x: i32, y: i32) -> bool;
    fn is_occupied(
        &self,
        x: i32,
        y: i32,
        ignore: Option<EntityId>,
        block_projectiles: bool,
    ) -> bool;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.cols() && y < self.rows()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub id: EntityId,
    pub kind: EntityKind,
    pub glyph: char,
    pub position: Vec2,
}

impl Occupant {
    fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            glyph: entity.glyph,
            position: entity.position(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Entity(Occupant),
    Terrain(char),
}

#[derive(Clone, Debug)]
pub struct Grid {
    maze: Maze,
    cells: Vec<Vec<char>>,
    occupants: Vec<Occupant>,
}

impl Grid {
    pub fn new(maze: Maze) -> Self {
        let cells = maze.tiles().to_vec();
        Self {
            maze,
            cells,
            occupants: Vec::new(),
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn wall_glyph(&self) -> char {
        self.maze.wall
    }

    pub fn clear(&mut self) {
        self.cells = self.maze.tiles().to_vec();
    }

    pub fn set_entities(&mut self, entities: &[Entity]) {
        self.occupants = entities.iter().map(Occupant::of).collect();
    }

    pub fn track(&mut self, entity: &Entity) {
        let occupant = Occupant::of(entity);
        match self.occupants.iter_mut().find(|o| o.id == entity.id) {
            Some(existing) => *existing = occupant,
            None => self.occupants.push(occupant),
        }
    }

    pub fn untrack(&mut self, id: EntityId) {
        self.occupants.retain(|o| o.id != id);
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// Writes the entity glyph, reverting it to its previous cell first when
    /// another tracked entity already holds the destination.
    pub fn place(&mut self, entity: &mut Entity) {
        if self.is_occupied(entity.x, entity.y, Some(entity.id), false) {
            entity.x = entity.prev_x;
            entity.y = entity.prev_y;
        }
        self.track(entity);

        let Some(cell) = self.cell_mut(entity.x, entity.y) else {
            return;
        };
        *cell = entity.glyph;
        entity.prev_x = entity.x;
        entity.prev_y = entity.y;
    }

    pub fn get(&self) -> &[Vec<char>] {
        &self.cells
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        if let Some(occupant) = self
            .occupants
            .iter()
            .find(|o| o.position.x == x && o.position.y == y)
        {
            return Some(Cell::Entity(*occupant));
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .map(|c| Cell::Terrain(*c))
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut char> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
    }
}

impl GridQuery for Grid {
    fn cols(&self) -> i32 {
        self.maze.cols
    }

    fn rows(&self) -> i32 {
        self.maze.rows
    }

    fn is_wall(&self, x: i32, y: i32) -> bool {
        self.maze.is_wall(x, y)
    }

    fn is_occupied(
        &self,
        x: i32,
        y: i32,
        ignore: Option<EntityId>,
        block_projectiles: bool,
    ) -> bool {
        if self.is_wall(x, y) {
            return true;
        }
        self.occupants.iter().any(|o| {
            Some(o.id) != ignore
                && o.position.x == x
                && o.position.y == y
                && (block_projectiles || o.kind != EntityKind::Projectile)
        })
    }
}
