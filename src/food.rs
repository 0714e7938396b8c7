use rand::seq::IteratorRandom;
use rand::Rng;

use crate::snake::Snake;
use crate::{Coords, GridInt};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    pos: Coords,
}

impl Food {
    pub fn at(pos: Coords) -> Self {
        Food { pos }
    }

    /// Places food on a random free cell. `None` when the snake fills the grid.
    pub fn spawn<R: Rng + ?Sized>(grid_size: GridInt, snake: &Snake, rng: &mut R) -> Option<Self> {
        free_cells(grid_size, snake).choose(rng).map(Food::at)
    }

    pub fn pos(&self) -> Coords {
        self.pos
    }

    /// Moves the food to a random free cell, uniformly. Returns `false` and
    /// leaves the food where it was if there is no free cell left.
    pub fn reset<R: Rng + ?Sized>(&mut self, grid_size: GridInt, snake: &Snake, rng: &mut R) -> bool {
        match Food::spawn(grid_size, snake, rng) {
            Some(food) => {
                *self = food;
                true
            }
            None => false,
        }
    }
}

fn free_cells(grid_size: GridInt, snake: &Snake) -> impl Iterator<Item = Coords> + '_ {
    (0..grid_size)
        .flat_map(move |y| (0..grid_size).map(move |x| Coords::new(x, y)))
        .filter(move |pos| !snake.occupies(*pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_stays_inside_grid_and_off_the_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::new(Coords::new(2, 2), 3, 5, Right);

        for _ in 0..200 {
            let food = Food::spawn(5, &snake, &mut rng).unwrap();
            assert!(food.pos().x < 5 && food.pos().y < 5);
            assert!(!snake.occupies(food.pos()));
        }
    }

    #[test]
    fn reset_finds_the_only_free_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        // 2x2 grid, three cells taken
        let snake = Snake::from_body(
            vec![Coords::new(0, 0), Coords::new(1, 0), Coords::new(1, 1)],
            Left,
        ).unwrap();
        let mut food = Food::at(Coords::new(0, 0));

        assert!(food.reset(2, &snake, &mut rng));
        assert_eq!(food.pos(), Coords::new(0, 1));
    }

    #[test]
    fn reset_on_full_grid_leaves_food_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        let snake = Snake::from_body(
            vec![Coords::new(0, 0), Coords::new(1, 0), Coords::new(1, 1), Coords::new(0, 1)],
            Up,
        ).unwrap();
        let mut food = Food::at(Coords::new(1, 1));

        assert!(!food.reset(2, &snake, &mut rng));
        assert_eq!(food.pos(), Coords::new(1, 1));
        assert!(Food::spawn(2, &snake, &mut rng).is_none());
    }

    #[test]
    fn same_seed_same_cell() {
        let snake = Snake::new(Coords::new(10, 10), 3, 20, Right);
        let a = Food::spawn(20, &snake, &mut StdRng::seed_from_u64(99));
        let b = Food::spawn(20, &snake, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
