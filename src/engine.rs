use log::debug;
use rand::Rng;

use crate::food::Food;
use crate::snake::{Direction, Snake};
use crate::{Coords, GridInt};

pub const INITIAL_SNAKE_LENGTH: usize = 3;
pub const INITIAL_DIRECTION: Direction = Direction::Right;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Moved { ate: bool },
    /// The head ran into the body. Nothing was mutated.
    Collided { score: u32 },
    /// The snake covers the whole grid, so no food can be placed.
    Filled { score: u32 },
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TickOutcome::Moved { .. })
    }
}

/// Everything that changes from tick to tick within one session.
#[derive(Clone, Debug)]
pub struct World {
    grid_size: GridInt,
    snake: Snake,
    food: Food,
    score: u32,
}

impl World {
    pub fn new<R: Rng + ?Sized>(grid_size: GridInt, rng: &mut R) -> Self {
        let center = Coords::new(grid_size / 2, grid_size / 2);
        let snake = Snake::new(center, INITIAL_SNAKE_LENGTH, grid_size, INITIAL_DIRECTION);
        // A fresh snake never fills a valid grid
        let food = Food::spawn(grid_size, &snake, rng).unwrap_or_else(|| Food::at(center));

        World { grid_size, snake, food, score: 0 }
    }

    pub fn from_parts(grid_size: GridInt, snake: Snake, food: Food) -> Self {
        World { grid_size, snake, food, score: 0 }
    }

    pub fn grid_size(&self) -> GridInt {
        self.grid_size
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turn(&mut self, direction: Direction) -> bool {
        self.snake.set_direction(direction)
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickOutcome {
        let new_head = self.snake.next_head(self.grid_size);

        // Checked against the body before it moves, tail included
        if self.snake.occupies(new_head) {
            debug!("snake bit itself at {:?}", new_head);
            return TickOutcome::Collided { score: self.score };
        }

        self.snake.commit_direction();

        let ate = new_head == self.food.pos();
        self.snake.advance(new_head, ate);

        if ate {
            self.score += 1;
            debug!("ate food at {:?}, score {}", new_head, self.score);

            if !self.food.reset(self.grid_size, &self.snake, rng) {
                return TickOutcome::Filled { score: self.score };
            }
        }

        TickOutcome::Moved { ate }
    }
}
