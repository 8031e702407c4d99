pub mod indicators;
pub mod utilities;

pub use indicators::edge::{
    edge, estimate_spread, Degeneracy, EdgeBuilder, EdgeError, EdgeInput, EdgeMoments, EdgeOutput,
    EdgeParams,
};
pub use utilities::data_loader::{read_candles_from_csv, Bar, Candles};
