//! Memoized asynchronous image acquisition for detail markers.
//!
//! The in-flight future itself is the cache value until it resolves, so a
//! node's image is fetched at most once at a time. Failures evict the entry
//! so a later frame can retry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, Shared};
use log::warn;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

use super::types::NodeId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ImageError {
	#[error("failed to load image {url}")]
	Load { url: String },
	#[error("could not create image element")]
	Element,
	#[error("image loader dropped before completion")]
	Cancelled,
}

/// Fetches one image. Implemented over `HtmlImageElement` in the browser.
pub trait ImageFetcher {
	type Image: Clone + 'static;

	fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Self::Image, ImageError>>;
}

pub type ImageFuture<I> = Shared<LocalBoxFuture<'static, Option<I>>>;

/// Runs a fire-and-forget future on the current thread's executor.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

enum Entry<I: Clone> {
	Pending(ImageFuture<I>),
	Ready(I),
}

pub struct ImageCache<F: ImageFetcher> {
	fetcher: F,
	entries: Rc<RefCell<HashMap<NodeId, Entry<F::Image>>>>,
	spawner: Spawner,
}

impl<F: ImageFetcher> ImageCache<F> {
	pub fn new(fetcher: F, spawner: Spawner) -> Self {
		Self {
			fetcher,
			entries: Rc::new(RefCell::new(HashMap::new())),
			spawner,
		}
	}

	/// The image for `id`, fetching it on first use. Resolves to `None` on failure.
	pub fn acquire(&self, id: &NodeId, url: &str) -> ImageFuture<F::Image> {
		if let Some(entry) = self.entries.borrow().get(id) {
			return match entry {
				Entry::Pending(fut) => fut.clone(),
				Entry::Ready(image) => futures::future::ready(Some(image.clone()))
					.boxed_local()
					.shared(),
			};
		}

		let fetch = self.fetcher.fetch(url);
		let entries = Rc::clone(&self.entries);
		let (key, url) = (id.clone(), url.to_owned());
		let fut = async move {
			match fetch.await {
				Ok(image) => {
					entries.borrow_mut().insert(key, Entry::Ready(image.clone()));
					Some(image)
				}
				Err(err) => {
					warn!("Image for {key} ({url}) unavailable: {err}");
					entries.borrow_mut().remove(&key);
					None
				}
			}
		}
		.boxed_local()
		.shared();

		self.entries
			.borrow_mut()
			.insert(id.clone(), Entry::Pending(fut.clone()));
		fut
	}

	/// A loaded image, if any. Never starts a fetch.
	pub fn get(&self, id: &NodeId) -> Option<F::Image> {
		match self.entries.borrow().get(id)? {
			Entry::Ready(image) => Some(image.clone()),
			Entry::Pending(_) => None,
		}
	}

	/// Non-blocking lookup for the render path: returns the image when loaded,
	/// otherwise makes sure a fetch is running and returns `None`.
	pub fn poll(&self, id: &NodeId, url: &str) -> Option<F::Image> {
		if let Some(image) = self.get(id) {
			return Some(image);
		}
		if self.is_pending(id) {
			return None;
		}
		let fut = self.acquire(id, url);
		(self.spawner)(fut.map(|_| ()).boxed_local());
		// The fetch may have completed synchronously.
		self.get(id)
	}

	pub fn is_pending(&self, id: &NodeId) -> bool {
		matches!(self.entries.borrow().get(id), Some(Entry::Pending(_)))
	}
}

/// Loads images through detached `<img>` elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlImageFetcher;

impl ImageFetcher for HtmlImageFetcher {
	type Image = HtmlImageElement;

	fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<HtmlImageElement, ImageError>> {
		let url = url.to_owned();
		async move {
			let image = HtmlImageElement::new().map_err(|_| ImageError::Element)?;
			let (tx, rx) = oneshot::channel::<bool>();
			let tx = Rc::new(RefCell::new(Some(tx)));
			let (tx_load, tx_error) = (Rc::clone(&tx), tx);

			let onload = Closure::once_into_js(move || {
				if let Some(tx) = tx_load.borrow_mut().take() {
					let _ = tx.send(true);
				}
			});
			let onerror = Closure::once_into_js(move || {
				if let Some(tx) = tx_error.borrow_mut().take() {
					let _ = tx.send(false);
				}
			});
			image.set_onload(Some(onload.unchecked_ref()));
			image.set_onerror(Some(onerror.unchecked_ref()));
			image.set_src(&url);

			let loaded = rx.await;
			image.set_onload(None);
			image.set_onerror(None);
			match loaded {
				Ok(true) => Ok(image),
				Ok(false) => Err(ImageError::Load { url }),
				Err(_) => Err(ImageError::Cancelled),
			}
		}
		.boxed_local()
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use std::cell::Cell;

	use super::*;

	/// Counts fetches; each fetch completes when its sender is fired.
	#[derive(Clone, Default)]
	pub struct CountingFetcher {
		pub calls: Rc<Cell<usize>>,
		pub pending: Rc<RefCell<Vec<(String, oneshot::Sender<Result<String, ImageError>>)>>>,
	}

	impl CountingFetcher {
		pub fn complete_all(&self, ok: bool) {
			for (url, tx) in self.pending.borrow_mut().drain(..) {
				let result = if ok {
					Ok(format!("img:{url}"))
				} else {
					Err(ImageError::Load { url })
				};
				let _ = tx.send(result);
			}
		}
	}

	impl ImageFetcher for CountingFetcher {
		type Image = String;

		fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<String, ImageError>> {
			self.calls.set(self.calls.get() + 1);
			let (tx, rx) = oneshot::channel();
			self.pending.borrow_mut().push((url.to_owned(), tx));
			async move { rx.await.unwrap_or(Err(ImageError::Cancelled)) }.boxed_local()
		}
	}

	/// Collects spawned futures so tests decide when they run.
	#[derive(Clone, Default)]
	pub struct ManualSpawner(pub Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>);

	impl ManualSpawner {
		pub fn spawner(&self) -> Spawner {
			let queue = Rc::clone(&self.0);
			Rc::new(move |fut| queue.borrow_mut().push(fut))
		}

		pub fn run_all(&self) {
			let futs: Vec<_> = self.0.borrow_mut().drain(..).collect();
			for fut in futs {
				futures::executor::block_on(fut);
			}
		}
	}
}
