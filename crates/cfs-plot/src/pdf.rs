//! Multi-page PDF output: a plotters backend that writes PDF content
//! streams, and a document assembled with `pdf-writer`.

use std::convert::Infallible;
use std::fs;
use std::path::Path;

use cfs_core::errors::{CfsError, ErrorInfo};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use plotters::prelude::IntoDrawingArea;
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};
use tracing::debug;

use crate::chart::draw_figure;
use crate::figure::LinePlot;

/// Page size in points (8 x 6 inches).
pub const PAGE_WIDTH: u32 = 576;
pub const PAGE_HEIGHT: u32 = 432;

const FONT: Name<'static> = Name(b"F1");

// control point distance of a quarter circle drawn as a cubic Bezier
const KAPPA: f32 = 0.552_284_8;

type DrawResult = Result<(), DrawingErrorKind<Infallible>>;

/// Plotters backend drawing into one PDF content stream.
///
/// One backend pixel is one point; plotters' y-down grid is flipped onto the
/// page. Translucent colours are blended onto the white page, every string
/// is set in the page's Helvetica font `/F1`.
pub struct PdfBackend<'a> {
    content: &'a mut Content,
    size: (u32, u32),
}

impl<'a> PdfBackend<'a> {
    pub fn new(content: &'a mut Content, size: (u32, u32)) -> Self {
        Self { content, size }
    }

    fn flip(&self, (x, y): BackendCoord) -> (f32, f32) {
        (x as f32, self.size.1 as f32 - y as f32)
    }

    fn fill_color(&mut self, color: BackendColor) -> bool {
        if color.alpha <= 0.0 {
            return false;
        }
        let (r, g, b) = blend(color);
        self.content.set_fill_rgb(r, g, b);
        true
    }

    fn stroke_style<S: BackendStyle>(&mut self, style: &S) -> bool {
        let color = style.color();
        if color.alpha <= 0.0 {
            return false;
        }
        let (r, g, b) = blend(color);
        self.content
            .set_stroke_rgb(r, g, b)
            .set_line_width(style.stroke_width() as f32);
        true
    }

    fn paint<S: BackendStyle>(&mut self, style: &S, fill: bool) -> bool {
        if fill {
            self.fill_color(style.color())
        } else {
            self.stroke_style(style)
        }
    }

    fn finish_path(&mut self, fill: bool) {
        if fill {
            self.content.fill_nonzero();
        } else {
            self.content.stroke();
        }
    }
}

/// RGB components in `0..=1` after compositing onto white.
fn blend(color: BackendColor) -> (f32, f32, f32) {
    let alpha = color.alpha.clamp(0.0, 1.0) as f32;
    let channel = |c: u8| 1.0 - alpha * (1.0 - c as f32 / 255.0);
    (
        channel(color.rgb.0),
        channel(color.rgb.1),
        channel(color.rgb.2),
    )
}

/// Single-byte text for the standard font; anything outside printable
/// ASCII becomes `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            _ => b'?',
        })
        .collect()
}

impl DrawingBackend for PdfBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> DrawResult {
        Ok(())
    }

    fn present(&mut self) -> DrawResult {
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> DrawResult {
        if self.fill_color(color) {
            let (x, y) = self.flip(point);
            self.content.rect(x, y - 1.0, 1.0, 1.0).fill_nonzero();
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> DrawResult {
        self.draw_path([from, to], style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        if !self.paint(style, fill) {
            return Ok(());
        }
        let (x0, y0) = self.flip(upper_left);
        let (x1, y1) = self.flip(bottom_right);
        self.content.rect(x0, y1, x1 - x0, y0 - y1);
        self.finish_path(fill);
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> DrawResult {
        let points: Vec<(f32, f32)> = path.into_iter().map(|p| self.flip(p)).collect();
        let Some((&(x, y), rest)) = points.split_first() else {
            return Ok(());
        };
        if rest.is_empty() || !self.stroke_style(style) {
            return Ok(());
        }
        self.content.move_to(x, y);
        for &(x, y) in rest {
            self.content.line_to(x, y);
        }
        self.content.stroke();
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        if radius == 0 || !self.paint(style, fill) {
            return Ok(());
        }
        let (cx, cy) = self.flip(center);
        let r = radius as f32;
        let k = KAPPA * r;
        self.content
            .move_to(cx + r, cy)
            .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
            .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
            .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
            .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
            .close_path();
        self.finish_path(fill);
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> DrawResult {
        let points: Vec<(f32, f32)> = vert.into_iter().map(|p| self.flip(p)).collect();
        let Some((&(x, y), rest)) = points.split_first() else {
            return Ok(());
        };
        if !self.fill_color(style.color()) {
            return Ok(());
        }
        self.content.move_to(x, y);
        for &(x, y) in rest {
            self.content.line_to(x, y);
        }
        self.content.close_path().fill_nonzero();
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> DrawResult {
        if text.is_empty() || !self.fill_color(style.color()) {
            return Ok(());
        }
        let ((x0, y0), (x1, y1)) = style
            .layout_box(text)
            .map_err(|err| DrawingErrorKind::FontError(Box::new(err)))?;
        let (x0, y0, x1, y1) = (x0 as f32, y0 as f32, x1 as f32, y1 as f32);

        // baseline origin relative to the anchor, in unrotated y-down text space
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => -x0,
            HPos::Center => -(x0 + x1) / 2.0,
            HPos::Right => -x1,
        };
        let dy = match anchor.v_pos {
            VPos::Top => -y0,
            VPos::Center => -(y0 + y1) / 2.0,
            VPos::Bottom => -y1,
        };
        let (ox, oy, [a, b, c, d]) = match style.transform() {
            FontTransform::None => (dx, dy, [1.0, 0.0, 0.0, 1.0]),
            FontTransform::Rotate90 => (-dy, dx, [0.0, -1.0, 1.0, 0.0]),
            FontTransform::Rotate180 => (-dx, -dy, [-1.0, 0.0, 0.0, -1.0]),
            FontTransform::Rotate270 => (dy, -dx, [0.0, 1.0, -1.0, 0.0]),
        };
        let (x, y) = (pos.0 as f32 + ox, self.size.1 as f32 - (pos.1 as f32 + oy));
        self.content
            .begin_text()
            .set_font(FONT, (y1 - y0).max(1.0))
            .set_text_matrix([a, b, c, d, x, y])
            .show(Str(&encode(text)))
            .end_text();
        Ok(())
    }
}

/// Multi-page document; the output depends only on the pages added.
#[derive(Debug, Default, Clone)]
pub struct PdfDocument {
    pages: Vec<Vec<u8>>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `plot` on a new page.
    pub fn add_page(&mut self, plot: &LinePlot) -> Result<(), CfsError> {
        let mut content = Content::new();
        {
            let root =
                PdfBackend::new(&mut content, (PAGE_WIDTH, PAGE_HEIGHT)).into_drawing_area();
            draw_figure(&root, plot)?;
            root.present().map_err(|err| {
                CfsError::Plot(
                    ErrorInfo::new("plot-draw", err.to_string())
                        .with_context("title", plot.title.clone()),
                )
            })?;
        }
        self.pages.push(content.finish());
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the document.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3 font, then each page at
    /// `4 + 2i` followed by its content stream at `5 + 2i`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let page_id = |idx: usize| Ref::new(4 + 2 * idx as i32);
        let content_id = |idx: usize| Ref::new(5 + 2 * idx as i32);

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids((0..self.pages.len()).map(page_id))
            .count(self.pages.len() as i32);
        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        for (idx, content) in self.pages.iter().enumerate() {
            let mut page = pdf.page(page_id(idx));
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH as f32, PAGE_HEIGHT as f32));
            page.parent(tree_id);
            page.contents(content_id(idx));
            page.resources().fonts().pair(FONT, font_id);
            page.finish();
            pdf.stream(content_id(idx), content);
        }
        pdf.finish()
    }

    /// Writes the document to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), CfsError> {
        if self.pages.is_empty() {
            return Err(CfsError::Plot(
                ErrorInfo::new("pdf-empty", "document has no pages")
                    .with_context("path", path.display().to_string()),
            ));
        }
        let io = |code: &str, err: std::io::Error| {
            CfsError::Plot(
                ErrorInfo::new(code, err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| io("pdf-dir", err))?;
        }
        let bytes = self.to_bytes();
        fs::write(path, &bytes).map_err(|err| io("pdf-write", err))?;
        debug!(path = %path.display(), pages = self.pages.len(), bytes = bytes.len(), "wrote pdf");
        Ok(())
    }
}
