use std::collections::VecDeque;

use crate::{Coords, GridInt, Result, SnakeError};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    // Head at the front
    body: VecDeque<Coords>,
    direction: Direction,
    pending: Option<Direction>,
}

impl Snake {
    /// Straight snake of `size` segments with the head at `head` and the rest
    /// of the body trailing downwards, wrapped onto the grid.
    pub fn new(head: Coords, size: usize, grid_size: GridInt, direction: Direction) -> Self {
        let mut body = VecDeque::with_capacity(size.max(1));
        let mut pos = head;

        for _ in 0..size.max(1) {
            body.push_back(pos);
            pos = pos.step(Down, grid_size);
        }

        Snake { body, direction, pending: None }
    }

    pub fn from_body<I>(body: I, direction: Direction) -> Result<Self>
    where
        I: IntoIterator<Item = Coords>,
    {
        let body: VecDeque<Coords> = body.into_iter().collect();

        if body.is_empty() {
            return Err(SnakeError::EmptySnake);
        }

        Ok(Snake { body, direction, pending: None })
    }

    pub fn head(&self) -> Coords {
        // Never empty: both constructors guarantee a segment and advance only grows
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = &Coords> + '_ {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending
    }

    /// Queues a turn for the next step. Reversing onto the neck is ignored,
    /// measured against the direction the snake is actually moving in.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction.opposite() {
            return false;
        }

        self.pending = Some(new_direction);
        true
    }

    /// Applies the queued turn, if any, and returns the direction to move in.
    pub fn commit_direction(&mut self) -> Direction {
        if let Some(dir) = self.pending.take() {
            self.direction = dir;
        }

        self.direction
    }

    pub fn next_head(&self, grid_size: GridInt) -> Coords {
        self.head().step(self.pending.unwrap_or(self.direction), grid_size)
    }

    pub fn advance(&mut self, new_head: Coords, grow: bool) {
        self.body.push_front(new_head);

        if !grow {
            self.body.pop_back();
        }
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
