//! Asset bridge: texture requests to the host, deduplicated and timed out.
//!
//! The preview cannot touch the filesystem; every image arrives from the
//! host as bytes in response to a `request:imageFile` message. Requests are
//! keyed by path, so any number of widgets referencing the same texture cost
//! one round-trip. Layout never waits on an asset: a missing texture just
//! renders flat until delivery triggers a repaint.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use craftkit_engine::render::{Renderer2d, Texture, TextureId};

use crate::error::PreviewError;
use crate::protocol::PreviewMessage;

/// A pending request older than this is dropped so a later request can retry.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

/// What a caller learns about an asset right now.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssetState {
    Ready(TextureId),
    Pending,
    Failed,
}

#[derive(Debug)]
enum Entry {
    Pending { request_id: u64, since: Instant },
    Ready(TextureId),
    Failed,
}

#[derive(Debug, Default)]
pub struct AssetBridge {
    entries: HashMap<String, Entry>,
    by_request: HashMap<u64, String>,
    next_request_id: u64,
    outgoing: Vec<PreviewMessage>,
}

impl AssetBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an asset, issuing a host request on first sight. Returns
    /// immediately in every case; a second caller for an in-flight path gets
    /// [`AssetState::Pending`] without a second round-trip.
    pub fn request(&mut self, path: &str, now: Instant) -> AssetState {
        match self.entries.get(path) {
            Some(Entry::Ready(id)) => return AssetState::Ready(*id),
            Some(Entry::Pending { .. }) => return AssetState::Pending,
            Some(Entry::Failed) => return AssetState::Failed,
            None => {}
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.entries
            .insert(path.to_string(), Entry::Pending { request_id, since: now });
        self.by_request.insert(request_id, path.to_string());
        self.outgoing.push(PreviewMessage::RequestImageFile {
            path: path.to_string(),
            request_id,
        });
        log::debug!("requesting image {path:?} (request {request_id})");
        AssetState::Pending
    }

    /// Decodes delivered bytes into a texture. Late deliveries for a request
    /// that already timed out are an error the session just logs.
    pub fn deliver(
        &mut self,
        request_id: u64,
        bytes: &[u8],
        renderer: &mut Renderer2d,
    ) -> Result<(), PreviewError> {
        let path = self
            .by_request
            .remove(&request_id)
            .ok_or(PreviewError::UnknownRequest(request_id))?;
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        let id = renderer.create_texture(Texture::new(width, height, image.into_raw()));
        self.entries.insert(path, Entry::Ready(id));
        Ok(())
    }

    /// Marks a request failed; callers see [`AssetState::Failed`] and render
    /// without the texture.
    pub fn fail(&mut self, request_id: u64) {
        if let Some(path) = self.by_request.remove(&request_id) {
            log::warn!("image request failed for {path:?}");
            self.entries.insert(path, Entry::Failed);
        }
    }

    /// Expires pending requests older than [`REQUEST_TIMEOUT`]. The entry is
    /// removed entirely, so the next `request` for the path starts fresh
    /// instead of hitting a poisoned marker.
    pub fn tick(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter_map(|(path, entry)| match entry {
                Entry::Pending { since, .. } if now.duration_since(*since) >= REQUEST_TIMEOUT => {
                    Some(path.clone())
                }
                _ => None,
            })
            .collect();
        for path in expired {
            if let Some(Entry::Pending { request_id, .. }) = self.entries.remove(&path) {
                self.by_request.remove(&request_id);
                log::warn!("image request for {path:?} timed out");
            }
        }
    }

    /// Drops all pending requests and cached entries.
    pub fn teardown(&mut self) {
        self.entries.clear();
        self.by_request.clear();
        self.outgoing.clear();
    }

    /// Messages queued for the host since the last call.
    pub fn take_outgoing(&mut self) -> Vec<PreviewMessage> {
        std::mem::take(&mut self.outgoing)
    }
}

// ── Atlas ─────────────────────────────────────────────────────────────────

/// Pixel-space region of one named subtexture inside the shared atlas.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AtlasRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The host-delivered atlas definition plus the texture it slices.
#[derive(Debug, Default, Clone)]
pub struct AtlasCatalog {
    pub texture_path: Option<String>,
    pub entries: HashMap<String, AtlasRect>,
}

/// A resolved `{...}` subtexture reference: which file to load and which
/// region of it to sample (`None` = the whole image).
#[derive(Debug, Clone, PartialEq)]
pub struct SubtextureRef {
    pub path: String,
    pub region: Option<AtlasRect>,
}

impl AtlasCatalog {
    /// Resolves a markup texture reference. Atlas names resolve to a region
    /// of the atlas texture; anything else is a plain file path.
    pub fn resolve(&self, reference: &str) -> Option<SubtextureRef> {
        let name = reference
            .strip_prefix('{')
            .and_then(|r| r.strip_suffix('}'))
            .unwrap_or(reference);
        if name.is_empty() {
            return None;
        }
        if let Some(region) = self.entries.get(name) {
            let path = self.texture_path.clone()?;
            return Some(SubtextureRef { path, region: Some(*region) });
        }
        Some(SubtextureRef { path: name.to_string(), region: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_1x1() -> Vec<u8> {
        // Smallest valid RGBA PNG: one opaque red pixel.
        let mut buf = Vec::new();
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn duplicate_requests_share_one_round_trip() {
        let mut bridge = AssetBridge::new();
        let now = Instant::now();
        assert_eq!(bridge.request("Textures/Gui/Button", now), AssetState::Pending);
        assert_eq!(bridge.request("Textures/Gui/Button", now), AssetState::Pending);
        assert_eq!(bridge.take_outgoing().len(), 1);
    }

    #[test]
    fn delivery_serves_every_caller() {
        let mut bridge = AssetBridge::new();
        let mut renderer = Renderer2d::new();
        let now = Instant::now();
        bridge.request("a.png", now);
        let msg = bridge.take_outgoing().pop().unwrap();
        let PreviewMessage::RequestImageFile { request_id, .. } = msg else {
            panic!("unexpected message {msg:?}");
        };

        bridge.deliver(request_id, &png_1x1(), &mut renderer).unwrap();
        let state = bridge.request("a.png", now);
        assert!(matches!(state, AssetState::Ready(_)));
    }

    #[test]
    fn failure_is_observable_not_fatal() {
        let mut bridge = AssetBridge::new();
        let now = Instant::now();
        bridge.request("missing.png", now);
        let Some(PreviewMessage::RequestImageFile { request_id, .. }) =
            bridge.take_outgoing().pop()
        else {
            panic!("no request issued");
        };
        bridge.fail(request_id);
        assert_eq!(bridge.request("missing.png", now), AssetState::Failed);
    }

    #[test]
    fn timeout_clears_the_pending_marker() {
        let mut bridge = AssetBridge::new();
        let start = Instant::now();
        bridge.request("slow.png", start);
        bridge.tick(start + REQUEST_TIMEOUT);

        // The retry issues a fresh request rather than seeing a stale marker.
        assert_eq!(bridge.request("slow.png", start + REQUEST_TIMEOUT), AssetState::Pending);
        assert_eq!(bridge.take_outgoing().len(), 2);
    }

    #[test]
    fn late_delivery_after_timeout_is_rejected() {
        let mut bridge = AssetBridge::new();
        let mut renderer = Renderer2d::new();
        let start = Instant::now();
        bridge.request("slow.png", start);
        let Some(PreviewMessage::RequestImageFile { request_id, .. }) =
            bridge.take_outgoing().pop()
        else {
            panic!("no request issued");
        };
        bridge.tick(start + REQUEST_TIMEOUT);
        let err = bridge.deliver(request_id, &png_1x1(), &mut renderer).unwrap_err();
        assert!(matches!(err, PreviewError::UnknownRequest(_)));
    }

    #[test]
    fn atlas_names_resolve_to_regions() {
        let mut catalog = AtlasCatalog::default();
        catalog.texture_path = Some("Textures/Atlas".to_string());
        catalog.entries.insert(
            "Gui/Button".to_string(),
            AtlasRect { x: 10.0, y: 20.0, width: 32.0, height: 16.0 },
        );

        let hit = catalog.resolve("{Gui/Button}").unwrap();
        assert_eq!(hit.path, "Textures/Atlas");
        assert!(hit.region.is_some());

        let miss = catalog.resolve("{Textures/Other}").unwrap();
        assert_eq!(miss.path, "Textures/Other");
        assert_eq!(miss.region, None);
    }
}
