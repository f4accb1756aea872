use resvg::usvg;
use tijdlijn_core::export::{RasterError, Rasterizer};
use tiny_skia::{Pixmap, Transform};

/// Renders export SVGs with resvg, using the system fonts.
pub struct ResvgRasterizer {
    options: usvg::Options<'static>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        tracing::debug!(faces = options.fontdb.len(), "loaded system fonts");
        Self { options }
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| RasterError::Svg(e.to_string()))?;
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RasterError::Allocation { width, height })?;

        let size = tree.size();
        let transform = Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }
}
