use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::images::{HtmlImageFetcher, ImageCache, Spawner};
use super::render;
use super::selection::SelectionSummary;
use super::state::ForceGraphState;
use super::types::{GraphData, NodeId};

type State = Rc<RefCell<Option<ForceGraphState<HtmlImageFetcher>>>>;

/// Fixed simulation step per animation frame, in seconds.
const FRAME_DT: f64 = 0.016;
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn local_spawner() -> Spawner {
	Rc::new(|fut| leptos::task::spawn_local(fut))
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] config: Signal<GraphConfig>,
	#[prop(optional, into)] on_select: Option<Callback<Option<SelectionSummary>>>,
	/// Node to select from outside the canvas, such as a search box.
	#[prop(optional, into)] focus: Option<Signal<Option<NodeId>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: State = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let emit = move |summary: Option<SelectionSummary>| {
		if let Some(cb) = on_select {
			cb.run(summary);
		}
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("Canvas has no 2d context");
			return;
		};
		let images = ImageCache::new(HtmlImageFetcher, local_spawner());
		let mut graph = ForceGraphState::new(config.get_untracked(), images, w, h);
		graph.load(data.get_untracked());
		*state_init.borrow_mut() = Some(graph);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running && s.is_active() {
					s.tick(FRAME_DT);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// The mount effect performs the initial load.
	let state_data = state.clone();
	Effect::new(move |prev: Option<()>| {
		let next = data.get();
		if prev.is_none() {
			return;
		}
		let cleared = {
			let mut guard = state_data.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			let had_selection = s.selection.selected().is_some();
			s.load(next);
			had_selection && s.selection.selected().is_none()
		};
		if cleared {
			debug!("Selected node filtered out");
			emit(None);
		}
	});

	let state_config = state.clone();
	Effect::new(move |_| {
		let next = config.get();
		if let Some(ref mut s) = *state_config.borrow_mut() {
			s.set_config(next);
		}
	});

	let state_focus = state.clone();
	Effect::new(move |_| {
		let Some(id) = focus.and_then(|f| f.get()) else {
			return;
		};
		let summary = {
			let mut guard = state_focus.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			s.select_node(&id)
		};
		debug!("Focused {id} from outside the canvas");
		emit(summary);
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.pointer_up());
		if let Some(summary) = clicked {
			emit(summary);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag = Default::default();
			s.pan.active = false;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(ev.as_ref()) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 {
				WHEEL_ZOOM_OUT
			} else {
				WHEEL_ZOOM_IN
			};
			s.camera.zoom_at(factor, x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
