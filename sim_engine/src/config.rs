/// Runtime-tunable constants that the original engine hardcodes. Left at their defaults this
/// produces byte-for-byte the same simulation behaviour as the original constants; a host
/// application (or a test) can override any of these without touching engine source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
	/// Game speed slider, 1..9. Higher is slower; `tick_time_duration = 2 * tick_speed` hundredths
	/// of a second between ticks.
	pub tick_speed: u8,
	/// Ticks a lit torch lasts before going out.
	pub torch_duration: i16,
	/// Ticks an energizer's invulnerability lasts.
	pub energizer_duration: i16,
	/// Maximum number of status elements allowed on a single board before creation becomes a no-op.
	pub max_stats: usize,
	/// Maximum number of boards a world may contain.
	pub max_boards: usize,
}

impl Default for SimConfig {
	fn default() -> SimConfig {
		SimConfig {
			tick_speed: 4,
			torch_duration: 200,
			energizer_duration: 75,
			max_stats: 150,
			max_boards: 100,
		}
	}
}
