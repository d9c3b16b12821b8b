mod lns;

pub use lns::InitLns;

use crate::common::Solution;

pub trait Solver {
    fn solve(&mut self) -> Option<Solution>;
}
