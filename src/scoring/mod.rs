pub mod engine;
pub mod patterns;
pub mod rank;
pub mod stats;
pub mod validation;
pub mod weights;

pub use engine::{aggregate, compute, FactorContribution, ScoreBreakdown, ScoredDistrict};
pub use patterns::{profile, FactorRatio, PatternProfile, Side};
pub use rank::{min_rank, rank_by_factor, rank_by_net};
pub use stats::{linear_fit, mean, pearson, LinearFit};
pub use validation::validate_scoring;
pub use weights::{Category, FactorWeight, SessionWeights, WeightRange, WeightSet};
