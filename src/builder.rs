use crate::solver::{FitEngine, FitProblem};

pub struct FitEngineBuilder {
    problem: FitProblem,
    wall: Option<i64>,
    audit: bool,
}

impl FitEngineBuilder {
    pub fn new(problem: FitProblem) -> Self {
        Self {
            problem,
            wall: None,
            audit: false,
        }
    }
    pub fn with_wall_slope(mut self, wall: i64) -> Self {
        self.wall = Some(wall);
        self
    }
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }
    pub fn build(self) -> FitEngine {
        let mut engine = match self.wall {
            Some(w) => FitEngine::with_wall_slope(self.problem, w),
            None => FitEngine::new(self.problem),
        };
        engine.set_audit(self.audit);
        engine
    }
}
