use std::fmt;
use std::str::FromStr;

use super::types::GraphLink;

/// Which precomputed edge score drives ranking and layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WeightMetric {
	#[default]
	Raw,
	Normalized,
	Composite,
	Uniqueness,
	Tribes,
	TribesSimplified,
}

impl WeightMetric {
	pub const ALL: [WeightMetric; 6] = [
		WeightMetric::Raw,
		WeightMetric::Normalized,
		WeightMetric::Composite,
		WeightMetric::Uniqueness,
		WeightMetric::Tribes,
		WeightMetric::TribesSimplified,
	];

	/// Parses a metric name; anything unrecognised means [`WeightMetric::Raw`].
	pub fn parse(name: &str) -> Self {
		match name {
			"normalized" => WeightMetric::Normalized,
			"composite" => WeightMetric::Composite,
			"uniqueness" => WeightMetric::Uniqueness,
			"tribes" => WeightMetric::Tribes,
			"tribes_simplified" => WeightMetric::TribesSimplified,
			_ => WeightMetric::Raw,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			WeightMetric::Raw => "raw",
			WeightMetric::Normalized => "normalized",
			WeightMetric::Composite => "composite",
			WeightMetric::Uniqueness => "uniqueness",
			WeightMetric::Tribes => "tribes",
			WeightMetric::TribesSimplified => "tribes_simplified",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			WeightMetric::Raw => "Raw",
			WeightMetric::Normalized => "Normalized",
			WeightMetric::Composite => "Composite",
			WeightMetric::Uniqueness => "Uniqueness",
			WeightMetric::Tribes => "Tribes",
			WeightMetric::TribesSimplified => "Tribes (simplified)",
		}
	}
}

impl FromStr for WeightMetric {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}

impl fmt::Display for WeightMetric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Reads the score selected by `metric`. Total and side-effect free.
pub fn resolve(link: &GraphLink, metric: WeightMetric) -> f64 {
	let w = &link.weights;
	match metric {
		WeightMetric::Raw => w.raw,
		WeightMetric::Normalized => w.normalized,
		WeightMetric::Composite => w.composite,
		WeightMetric::Uniqueness => w.uniqueness,
		WeightMetric::Tribes => w.tribes,
		WeightMetric::TribesSimplified => w.tribes_simplified,
	}
}

/// Optional nonlinear shaping applied to resolved weights before the layout laws.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WeightShaping {
	#[default]
	Identity,
	/// `weight^p`; `p > 1` separates strong relationships from weak ones.
	Power(f64),
}

impl WeightShaping {
	pub fn apply(self, weight: f64) -> f64 {
		match self {
			WeightShaping::Identity => weight,
			WeightShaping::Power(p) => weight.max(0.0).powf(p),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::EdgeWeights;

	fn link() -> GraphLink {
		GraphLink::new(
			"a",
			"b",
			EdgeWeights {
				raw: 0.1,
				normalized: 0.2,
				composite: 0.3,
				uniqueness: 0.4,
				tribes: 0.5,
				tribes_simplified: 0.6,
			},
		)
	}

	#[test]
	fn each_metric_reads_its_own_field() {
		let l = link();
		let got: Vec<f64> = WeightMetric::ALL.iter().map(|&m| resolve(&l, m)).collect();
		assert_eq!(got, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
	}

	#[test]
	fn unknown_metric_behaves_like_raw() {
		let l = link();
		assert_eq!(WeightMetric::parse("bogus"), WeightMetric::Raw);
		assert_eq!(resolve(&l, "bogus".parse().unwrap()), resolve(&l, WeightMetric::Raw));
	}

	#[test]
	fn names_round_trip() {
		for m in WeightMetric::ALL {
			assert_eq!(WeightMetric::parse(m.name()), m);
		}
	}

	#[test]
	fn resolve_is_repeatable() {
		let l = link();
		for m in WeightMetric::ALL {
			assert_eq!(resolve(&l, m), resolve(&l, m));
		}
	}

	#[test]
	fn shaping() {
		assert_eq!(WeightShaping::Identity.apply(0.3), 0.3);
		assert!((WeightShaping::Power(2.0).apply(0.5) - 0.25).abs() < 1e-12);
		assert_eq!(WeightShaping::Power(2.0).apply(-1.0), 0.0);
	}
}
