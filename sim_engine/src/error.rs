use world_format::WorldFormatError;

/// Errors surfaced at the simulation engine's public API boundary (world load/save failure).
///
/// Resource ceilings (`BoardSimulator::max_stats`, `SimEngine::max_boards`) are deliberately not
/// represented here: exceeding one is a silent no-op there, exactly as the element catalog
/// specifies, observable only via `log::warn!` rather than an `Err` a caller would have to handle.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
	#[error("failed to load world: {0}")]
	WorldLoad(#[from] WorldFormatError),
	#[error("failed to save world: {0}")]
	WorldSave(WorldFormatError),
}
