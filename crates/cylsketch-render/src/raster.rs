//! Frame submission and the tiny-skia software rasterizer.
//!
//! There is no depth buffer. Filled geometry is drawn back to front
//! (floor, then the reference box sorted by depth) and line strips go
//! on top, which is the only order this scene needs.

use cylsketch_core::{RenderFrame, Rgb};
use glam::DMat4;
use image::{Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::clip::{ClipVertex, clip_polygon, clip_segment};
use crate::draw::{DrawCall, Primitive, draw_calls, reference_box};
use crate::program::RenderProgram;

/// Longest sub-segment, in pixels, used to approximate a color
/// gradient along a line.
const GRADIENT_STEP_PX: f64 = 6.0;

/// Upper bound on sub-segments per line segment.
const MAX_GRADIENT_STEPS: f64 = 16.0;

/// Per-call drawing parameters derived from the active program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    /// Line width in pixels.
    pub line_width: f32,
    /// Anti-alias edges.
    pub anti_alias: bool,
    /// Multiplier applied to vertex colors.
    pub tint: Rgb,
}

impl DrawStyle {
    fn from_program(program: &RenderProgram, tint: Rgb) -> Self {
        Self {
            line_width: program.vertex.line_width,
            anti_alias: program.vertex.anti_alias,
            tint,
        }
    }
}

/// A target that accepts cleared frames and draw calls.
pub trait RenderSubmitter {
    /// Fill the whole target with `color`.
    fn clear(&mut self, color: Rgb);

    /// Draw `call` with every vertex transformed by `mvp`.
    fn draw(&mut self, call: &DrawCall<'_>, mvp: &DMat4, style: &DrawStyle);
}

/// Submit one frame: clear, then floor, reference box, and line strips.
///
/// With no program only the clear happens, in black.
pub fn submit_frame<R: RenderSubmitter + ?Sized>(
    target: &mut R,
    frame: &RenderFrame<'_>,
    program: Option<&RenderProgram>,
) {
    let Some(program) = program else {
        tracing::debug!("no render program, nothing to render");
        target.clear(Rgb::BLACK);
        return;
    };
    target.clear(program.fragment.clear_color);

    let view_projection = frame.projection * frame.view;
    let calls = draw_calls(frame.store);
    let plain = DrawStyle::from_program(program, Rgb::WHITE);
    let floor = DrawStyle::from_program(program, program.fragment.floor_tint);

    for call in calls.iter().filter(|c| c.primitive != Primitive::LineStrip) {
        target.draw(call, &view_projection, &floor);
    }

    let mesh = reference_box();
    let box_call = DrawCall {
        primitive: Primitive::Triangles,
        vertices: &mesh,
    };
    target.draw(&box_call, &(view_projection * frame.world), &plain);

    for call in calls.iter().filter(|c| c.primitive == Primitive::LineStrip) {
        target.draw(call, &view_projection, &plain);
    }
}

/// CPU rasterizer backed by a tiny-skia pixmap.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    pixmap: Pixmap,
}

impl SoftwareRenderer {
    /// A blank target. `None` if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    /// Copy the pixels out as straight (non-premultiplied) RGBA.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_image(&self) -> RgbaImage {
        let data = self.pixmap.data();
        let mut img = RgbaImage::new(self.width(), self.height());
        for (i, pixel) in img.pixels_mut().enumerate() {
            let off = i * 4;
            let a = data[off + 3];
            if a == 0 {
                *pixel = Rgba([0, 0, 0, 0]);
            } else {
                let r = u16::from(data[off]) * 255 / u16::from(a);
                let g = u16::from(data[off + 1]) * 255 / u16::from(a);
                let b = u16::from(data[off + 2]) * 255 / u16::from(a);
                *pixel = Rgba([r as u8, g as u8, b as u8, a]);
            }
        }
        img
    }

    fn screen_size(&self) -> (f64, f64) {
        (f64::from(self.width()), f64::from(self.height()))
    }

    fn fill_triangles(&mut self, call: &DrawCall<'_>, mvp: &DMat4, style: &DrawStyle) {
        let (w, h) = self.screen_size();
        let mut polygons: Vec<(f64, Vec<(f32, f32)>, Rgb)> = call
            .triangles()
            .into_iter()
            .filter_map(|tri| {
                let corners = tri.map(|i| ClipVertex::project(mvp, &call.vertices[i]));
                let clipped = clip_polygon(&corners);
                if clipped.is_empty() {
                    return None;
                }
                let depth = clipped
                    .iter()
                    .map(|v| v.position.z / v.position.w)
                    .sum::<f64>()
                    / as_f64(clipped.len());
                let points = clipped
                    .iter()
                    .map(|v| to_f32_point(v.to_screen(w, h)))
                    .collect();
                let color = tinted(mean_color(&corners), style.tint);
                Some((depth, points, color))
            })
            .collect();

        // Farthest first.
        polygons.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, points, color) in polygons {
            let mut pb = PathBuilder::new();
            let mut iter = points.into_iter();
            if let Some((x, y)) = iter.next() {
                pb.move_to(x, y);
                for (x, y) in iter {
                    pb.line_to(x, y);
                }
                pb.close();
            }
            let Some(path) = pb.finish() else {
                continue;
            };
            let paint = solid_paint(color, style.anti_alias);
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn stroke_lines(&mut self, call: &DrawCall<'_>, mvp: &DMat4, style: &DrawStyle) {
        let (w, h) = self.screen_size();
        let stroke = Stroke {
            width: style.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for (a, b) in call.segments() {
            let Some((a, b)) = clip_segment(ClipVertex::project(mvp, a), ClipVertex::project(mvp, b))
            else {
                continue;
            };
            let (pa, pb) = (a.to_screen(w, h), b.to_screen(w, h));
            let steps = (pa.distance(pb) / GRADIENT_STEP_PX)
                .ceil()
                .clamp(1.0, MAX_GRADIENT_STEPS);
            let n = steps as u32;
            for k in 0..n {
                let t0 = f64::from(k) / steps;
                let t1 = f64::from(k + 1) / steps;
                let mid = 0.5 * (t0 + t1);
                let color = tinted(lerp_color(a.color, b.color, mid), style.tint);

                let mut path = PathBuilder::new();
                let (x0, y0) = to_f32_point(pa.lerp(pb, t0));
                let (x1, y1) = to_f32_point(pa.lerp(pb, t1));
                path.move_to(x0, y0);
                path.line_to(x1, y1);
                let Some(path) = path.finish() else {
                    continue;
                };
                let paint = solid_paint(color, style.anti_alias);
                self.pixmap
                    .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }
}

impl RenderSubmitter for SoftwareRenderer {
    fn clear(&mut self, color: Rgb) {
        let [r, g, b] = to_rgb8(color);
        self.pixmap.fill(Color::from_rgba8(r, g, b, 255));
    }

    fn draw(&mut self, call: &DrawCall<'_>, mvp: &DMat4, style: &DrawStyle) {
        match call.primitive {
            Primitive::Triangles | Primitive::TriangleStrip => self.fill_triangles(call, mvp, style),
            Primitive::LineStrip => self.stroke_lines(call, mvp, style),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32_point(p: glam::DVec2) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_rgb8(c: Rgb) -> [u8; 3] {
    [c.r, c.g, c.b].map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn solid_paint(color: Rgb, anti_alias: bool) -> Paint<'static> {
    let [r, g, b] = to_rgb8(color);
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = anti_alias;
    paint
}

fn mean_color(vertices: &[ClipVertex; 3]) -> Rgb {
    let sum = vertices.iter().fold(Rgb::BLACK, |acc, v| {
        Rgb::new(acc.r + v.color.r, acc.g + v.color.g, acc.b + v.color.b)
    });
    Rgb::new(sum.r / 3.0, sum.g / 3.0, sum.b / 3.0)
}

fn lerp_color(a: Rgb, b: Rgb, t: f64) -> Rgb {
    Rgb::new(
        t.mul_add(b.r - a.r, a.r),
        t.mul_add(b.g - a.g, a.g),
        t.mul_add(b.b - a.b, a.b),
    )
}

fn tinted(c: Rgb, tint: Rgb) -> Rgb {
    Rgb::new(c.r * tint.r, c.g * tint.g, c.b * tint.b)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cylsketch_core::{Control, FrameInput, Session, SketchConfig};

    use super::*;
    use crate::program::{FragmentStage, VertexStage};

    const W: u32 = 160;
    const H: u32 = 90;

    fn program() -> RenderProgram {
        RenderProgram {
            vertex: VertexStage::default(),
            fragment: FragmentStage::default(),
        }
    }

    fn input(controls: &[Control], look: [f64; 2]) -> FrameInput {
        FrameInput {
            delta_time: 1.0 / 60.0,
            look_delta: look,
            held: controls.iter().copied().collect(),
        }
    }

    fn render(session: &Session, program: Option<&RenderProgram>) -> RgbaImage {
        let mut renderer = SoftwareRenderer::new(W, H).unwrap();
        let frame = session.render_frame(renderer.aspect());
        submit_frame(&mut renderer, &frame, program);
        renderer.to_image()
    }

    /// Records submissions instead of drawing.
    #[derive(Default)]
    struct Recorder {
        clears: Vec<Rgb>,
        calls: Vec<(Primitive, usize)>,
    }

    impl RenderSubmitter for Recorder {
        fn clear(&mut self, color: Rgb) {
            self.clears.push(color);
        }

        fn draw(&mut self, call: &DrawCall<'_>, _mvp: &DMat4, _style: &DrawStyle) {
            self.calls.push((call.primitive, call.vertices.len()));
        }
    }

    #[test]
    fn zero_sized_target_is_rejected() {
        assert!(SoftwareRenderer::new(0, 10).is_none());
    }

    #[test]
    fn without_program_only_clears() {
        let session = Session::new(SketchConfig::default()).unwrap();
        let mut recorder = Recorder::default();
        submit_frame(&mut recorder, &session.render_frame(1.0), None);
        assert_eq!(recorder.clears, vec![Rgb::BLACK]);
        assert!(recorder.calls.is_empty());

        let img = render(&session, None);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn submission_order_is_floor_box_lines() {
        let mut session = Session::new(SketchConfig::default()).unwrap();
        for _ in 0..4 {
            session.frame(&input(&[Control::Draw], [10.0, 0.0]));
        }
        let mut recorder = Recorder::default();
        submit_frame(&mut recorder, &session.render_frame(1.0), Some(&program()));
        assert_eq!(
            recorder.calls,
            vec![
                (Primitive::TriangleStrip, 5),
                (Primitive::Triangles, 36),
                (Primitive::LineStrip, 4),
            ]
        );
    }

    #[test]
    fn clear_color_comes_from_program() {
        let session = Session::new(SketchConfig::default()).unwrap();
        let mut p = program();
        p.fragment.clear_color = Rgb::new(0.0, 0.0, 1.0);
        let img = render(&session, Some(&p));
        // The top row looks over the floor's far edge into the background.
        assert_eq!(img.get_pixel(W / 2, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn floor_fills_the_bottom_of_the_live_view() {
        let session = Session::new(SketchConfig::default()).unwrap();
        let img = render(&session, Some(&program()));
        let [r, g, b, a] = img.get_pixel(W / 2, H - 1).0;
        assert_eq!(a, 255);
        assert!(r > 0 && r == g && g == b, "floor pixel {r} {g} {b}");
    }

    #[test]
    fn stroke_ahead_is_drawn_through_the_centre() {
        let mut session = Session::new(SketchConfig::default()).unwrap();
        for _ in 0..6 {
            session.frame(&input(&[Control::Draw], [10.0, 0.0]));
        }
        let img = render(&session, Some(&program()));
        let [r, g, b, _] = img.get_pixel(W / 2, H / 2).0;
        assert!(r > 200 && g > 200 && b > 200, "centre pixel {r} {g} {b}");
    }

    #[test]
    fn capture_view_shows_the_unrolled_stroke() {
        let mut session = Session::new(SketchConfig::default()).unwrap();
        for _ in 0..20 {
            session.frame(&input(&[Control::Draw], [10.0, 0.0]));
        }
        session.frame(&input(&[Control::Flatten], [0.0, 0.0]));
        assert!(session.frame(&input(&[], [0.0, 0.0])).capture);

        let img = render(&session, Some(&program()));
        let bright = (0..W)
            .filter(|&x| img.get_pixel(x, H / 2).0[..3].iter().all(|&c| c > 200))
            .count();
        assert!(bright > 0, "no stroke pixels on the centre row");
    }
}
