use leptos::prelude::*;
use log::{error, info};

use crate::components::filters::{GraphFilter, date_range, parse_date, tribe_popularity};
use crate::components::force_graph::{
	ColorTag, ForceGraphCanvas, GraphConfig, GraphData, NodeId, SelectionSummary, WeightMetric,
};
use crate::components::search::search_matches;

const NODES_JSON: &str = include_str!("../../data/nodes.json");
const EDGES_JSON: &str = include_str!("../../data/edges.json");

/// The commander dataset shipped with the app. A rejected bundle shows an empty graph.
fn bundled_commanders() -> GraphData {
	match GraphData::from_json(NODES_JSON, EDGES_JSON) {
		Ok(data) => {
			info!("Bundled dataset: {} commanders", data.nodes().len());
			data
		}
		Err(err) => {
			error!("Bundled dataset rejected: {err}");
			GraphData::default()
		}
	}
}

#[component]
fn DetailPanel(summary: SelectionSummary) -> impl IntoView {
	view! {
		<aside class="detail-panel">
			<h2>{summary.name}</h2>
			<ol>
				{summary
					.neighbors
					.into_iter()
					.map(|n| {
						view! {
							<li>
								{n.name} " " <span class="weight">{format!("{:.3}", n.weight)}</span>
							</li>
						}
					})
					.collect_view()}
			</ol>
		</aside>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let commanders = StoredValue::new(bundled_commanders());
	let (metric, set_metric) = signal(WeightMetric::Normalized);
	let (size_by_popularity, set_size_by_popularity) = signal(false);
	let (colors, set_colors) = signal(Vec::<ColorTag>::new());
	let (released_from, set_released_from) = signal(None);
	let (released_to, set_released_to) = signal(None);
	let (tribe, set_tribe) = signal(None::<String>);
	let (search, set_search) = signal(String::new());
	let (focus, set_focus) = signal(None::<NodeId>);
	let (selected, set_selected) = signal(None::<SelectionSummary>);

	let config = Signal::derive(move || GraphConfig {
		metric: metric.get(),
		size_by_popularity: size_by_popularity.get(),
		colors: colors.get(),
		date_range: date_range(released_from.get(), released_to.get()),
		selected_tribe: tribe.get(),
	});
	let filter = Memo::new(move |_| GraphFilter::from(&config.get()));
	let graph_data =
		Memo::new(move |_| filter.with(|f| commanders.with_value(|data| f.apply(data))));
	let tribes = Memo::new(move |_| graph_data.with(tribe_popularity));
	let suggestions = Memo::new(move |_| {
		let term = search.get();
		graph_data.with(|data| {
			search_matches(data, &term)
				.into_iter()
				.map(|n| (n.id.clone(), n.label().to_owned()))
				.collect::<Vec<_>>()
		})
	});
	let on_select = Callback::new(move |summary: Option<SelectionSummary>| {
		set_selected.set(summary)
	});

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_data
				config=config
				on_select=on_select
				focus=focus
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Commander Graph"</h1>
				<p class="subtitle">
					"Click a commander to see its closest neighbours. Scroll to zoom, drag to pan."
				</p>
				<div class="search">
					<input
						type="search"
						placeholder="Search commanders"
						prop:value=move || search.get()
						on:input=move |ev| set_search.set(event_target_value(&ev))
					/>
					<ul class="suggestions">
						{move || {
							suggestions
								.get()
								.into_iter()
								.map(|(id, label)| {
									view! {
										<li>
											<button on:click=move |_| {
												set_focus.set(Some(id.clone()));
												set_search.set(String::new());
											}>{label}</button>
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
				<label>
					"Weight "
					<select on:change=move |ev| {
						set_metric.set(WeightMetric::parse(&event_target_value(&ev)))
					}>
						{WeightMetric::ALL
							.into_iter()
							.map(|m| {
								view! {
									<option value=m.name() selected=move || metric.get() == m>
										{m.label()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || size_by_popularity.get()
						on:change=move |ev| set_size_by_popularity.set(event_target_checked(&ev))
					/>
					" Size by popularity"
				</label>
				<div class="color-filter">
					{ColorTag::ALL
						.into_iter()
						.map(|tag| {
							view! {
								<label class="color-toggle">
									<input
										type="checkbox"
										prop:checked=move || colors.with(|c| c.contains(&tag))
										on:change=move |ev| {
											let on = event_target_checked(&ev);
											set_colors
												.update(|c| {
													c.retain(|t| *t != tag);
													if on {
														c.push(tag);
													}
												});
										}
									/>
									{tag.label()}
								</label>
							}
						})
						.collect_view()}
				</div>
				<div class="date-filter">
					<label>
						"Released from "
						<input
							type="date"
							on:change=move |ev| set_released_from.set(parse_date(&event_target_value(&ev)))
						/>
					</label>
					<label>
						" to "
						<input
							type="date"
							on:change=move |ev| set_released_to.set(parse_date(&event_target_value(&ev)))
						/>
					</label>
				</div>
				<label>
					"Tribe "
					<select on:change=move |ev| {
						let name = event_target_value(&ev);
						set_tribe.set((!name.is_empty()).then_some(name));
					}>
						<option value="" selected=move || tribe.with(Option::is_none)>
							"None"
						</option>
						{move || {
							tribes
								.get()
								.into_iter()
								.map(|t| {
									let name = t.name.clone();
									let is_selected = move || tribe.with(|s| s.as_deref() == Some(name.as_str()));
									view! {
										<option value=t.name.clone() selected=is_selected>
											{format!("{} ({})", t.name, t.top_three)}
										</option>
									}
								})
								.collect_view()
						}}
					</select>
				</label>
			</div>
			{move || selected.get().map(|summary| view! { <DetailPanel summary=summary /> })}
		</div>
	}
}
