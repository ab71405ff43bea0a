use chrono::NaiveDate;

use super::types::ColorTag;
use super::weight::WeightMetric;

/// User-selected settings supplied by the page.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	pub metric: WeightMetric,
	/// Scale overview markers by popularity rank.
	pub size_by_popularity: bool,
	/// Colour allow-list for the pre-filter; empty shows everything.
	pub colors: Vec<ColorTag>,
	/// Inclusive release-date window for the pre-filter.
	pub date_range: Option<(NaiveDate, NaiveDate)>,
	/// Tribe whose members get a ring around their overview marker.
	pub selected_tribe: Option<String>,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			metric: WeightMetric::Normalized,
			size_by_popularity: false,
			colors: Vec::new(),
			date_range: None,
			selected_tribe: None,
		}
	}
}
