//! Core processing building blocks: the raster type, tone curves, effects,
//! color layers, histograms, fusion, geometry, the filter pipeline and save
//! helpers. These are the primitives consumed by the high-level `api` module.
pub mod params;
pub mod processing;
pub mod raster;
