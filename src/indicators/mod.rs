pub mod edge;
pub use edge::{
    edge, estimate_spread, Degeneracy, EdgeBuilder, EdgeData, EdgeError, EdgeInput, EdgeMoments,
    EdgeOutput, EdgeParams,
};
