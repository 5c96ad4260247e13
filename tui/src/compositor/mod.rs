//! Layered Compositor
//!
//! Manages z-ordered layers for rendering. Each layer has its own buffer
//! and can be positioned, resized and hidden independently.
//!
//! The compositor composites all visible layers into a final output buffer.
//! A layer's own buffer is exactly what it shows on screen, which is what
//! the signboard export hands to the exporter.

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u32);

/// A z-ordered region with its own buffer in layer-local coordinates
struct Layer {
    z_index: i32,
    bounds: Rect,
    visible: bool,
    buffer: Buffer,
}

impl Layer {
    fn new(bounds: Rect, z_index: i32) -> Self {
        Self {
            z_index,
            bounds,
            visible: true,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    /// Copy painted cells onto `output`
    ///
    /// Blank cells with no background are holes; anything painted occludes.
    fn blit(&self, output: &mut Buffer) {
        let area = output.area;
        for ly in 0..self.bounds.height {
            for lx in 0..self.bounds.width {
                let (x, y) = (self.bounds.x + lx, self.bounds.y + ly);
                if x >= area.width || y >= area.height {
                    continue;
                }
                let cell = &self.buffer[(lx, ly)];
                if cell.symbol() != " " || cell.bg != Color::Reset {
                    output[(x, y)] = cell.clone();
                }
            }
        }
    }
}

/// The compositor manages all layers and composites them together
pub struct Compositor {
    /// All layers by ID
    layers: HashMap<LayerId, Layer>,
    /// Layers sorted by z-index for rendering
    render_order: Vec<LayerId>,
    /// Next layer ID to assign
    next_id: u32,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
}

impl Compositor {
    /// Create a new compositor for the given area
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_id: 0,
            output: Buffer::empty(area),
            area,
        }
    }

    /// Create a new layer and return its ID
    pub fn create_layer(&mut self, bounds: Rect, z_index: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let layer = Layer::new(bounds, z_index);
        self.layers.insert(id, layer);
        self.update_render_order();

        id
    }

    /// Get mutable access to a layer's buffer for rendering
    pub fn layer_buffer_mut(&mut self, id: LayerId) -> Option<&mut Buffer> {
        self.layers.get_mut(&id).map(|l| &mut l.buffer)
    }

    /// A layer's buffer as last rendered
    pub fn layer_buffer(&self, id: LayerId) -> Option<&Buffer> {
        self.layers.get(&id).map(|l| &l.buffer)
    }

    /// Screen bounds of a layer
    pub fn layer_bounds(&self, id: LayerId) -> Option<Rect> {
        self.layers.get(&id).map(|l| l.bounds)
    }

    /// Move and resize a layer
    ///
    /// The buffer is only reallocated when the size changes.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Rect) {
        if let Some(layer) = self.layers.get_mut(&id) {
            let resized =
                layer.bounds.width != bounds.width || layer.bounds.height != bounds.height;
            layer.bounds = bounds;
            if resized {
                // Buffer uses origin coordinates
                layer.buffer = Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height));
            }
        }
    }

    /// Set layer visibility
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.visible = visible;
        }
    }

    /// Whether a layer is currently shown
    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|l| l.visible)
    }

    /// Resize the entire compositor
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
    }

    /// Total area
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Composite all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        // Back to front
        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id).filter(|l| l.visible) {
                layer.blit(&mut self.output);
            }
        }

        &self.output
    }

    /// Update render order based on z-indices
    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().copied().collect();
        self.render_order.sort_by_key(|id| {
            (
                self.layers.get(id).map(|l| l.z_index).unwrap_or(0),
                id.0,
            )
        });
    }
}
