mod results;

pub use results::ResolvedTracksStore;
