//! `sf-inspect`: summarize or normalize a saved canvas document.
//!
//! ```text
//! sf-inspect <file.json> [WIDTHxHEIGHT]   summary + zoom-to-fit for that screen
//! sf-inspect --normalize                  stdin → validated, settled JSON on stdout
//! ```
//!
//! Set `RUST_LOG=debug` for loader diagnostics.

use sf_core::{CanvasDocument, ShapeKind, Size, ViewportAction, ViewportConfig, ViewportState};
use std::collections::BTreeMap;
use std::error::Error;
use std::io::Read;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    // ── `--normalize` mode ──────────────────────────────────────────────
    // Used by scripts to clean up hand-edited documents.
    if args.first().map(String::as_str) == Some("--normalize") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        let doc = CanvasDocument::from_json(&text)?;
        println!("{}", doc.to_json()?);
        return Ok(());
    }

    let Some(path) = args.first() else {
        eprintln!("usage: sf-inspect <file.json> [WIDTHxHEIGHT]");
        eprintln!("       sf-inspect --normalize < file.json");
        std::process::exit(2);
    };
    let screen = match args.get(1) {
        Some(s) => parse_size(s).ok_or_else(|| format!("bad screen size '{s}', expected WIDTHxHEIGHT"))?,
        None => Size::default(),
    };

    let text = std::fs::read_to_string(path)?;
    let (doc, error) = CanvasDocument::from_json_or_default(&text);
    if let Some(e) = error {
        eprintln!("sf-inspect: {path}: {e}");
        std::process::exit(1);
    }
    print!("{}", summarize(&doc, screen));
    Ok(())
}

fn parse_size(s: &str) -> Option<Size> {
    let (w, h) = s.split_once(['x', 'X'])?;
    let size = Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    (size.width > 0.0 && size.height > 0.0).then_some(size)
}

fn summarize(doc: &CanvasDocument, screen: Size) -> String {
    let shapes = &doc.shapes;
    let mut out = String::new();

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for shape in shapes.shapes.iter() {
        *kinds.entry(shape.kind.name()).or_default() += 1;
    }
    out.push_str(&format!("shapes: {}\n", shapes.shapes.len()));
    for (kind, count) in &kinds {
        out.push_str(&format!("  {kind:<12}{count}\n"));
    }
    out.push_str(&format!("next frame number: {}\n", shapes.frame_counter));

    for frame in shapes.frames() {
        let b = frame.bounds();
        out.push_str(&format!(
            "frame #{} `{}` at ({}, {}) {}x{}\n",
            frame.frame_number().unwrap_or_default(),
            frame.id,
            b.x,
            b.y,
            b.w,
            b.h
        ));
        for id in shapes.shapes_in_frame(frame.id) {
            if let Some(inner) = shapes.get(id) {
                out.push_str(&format!("  {} `{}`\n", inner.kind.name(), inner.id));
            }
        }
        for id in shapes.generated_from(frame.id) {
            let status = match shapes.get(id).map(|s| &s.kind) {
                Some(ShapeKind::GeneratedUi { payload, .. }) if payload.is_empty() => "pending",
                _ => "ready",
            };
            out.push_str(&format!("  ↳ generated `{id}` ({status})\n"));
        }
    }

    out.push_str(&format!(
        "viewport: scale {:.3}, translate ({}, {})\n",
        doc.viewport.scale, doc.viewport.translate.x, doc.viewport.translate.y
    ));
    match shapes.content_bounds() {
        Some(content) => {
            let fit = ViewportState::new(&ViewportConfig::default()).reduce(ViewportAction::ZoomToFit {
                content,
                screen,
                margin: ViewportConfig::default().fit_margin,
            });
            out.push_str(&format!(
                "fit {}x{}: scale {:.3}, translate ({:.1}, {:.1})\n",
                screen.width, screen.height, fit.scale, fit.translate.x, fit.translate.y
            ));
        }
        None => out.push_str("fit: empty canvas\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::{Bounds, Shape, ShapeAction, ShapeId, ShapeStyle, ShapesState};

    #[test]
    fn sizes() {
        assert_eq!(parse_size("1280x720"), Some(Size::new(1280.0, 720.0)));
        assert_eq!(parse_size("800X600"), Some(Size::new(800.0, 600.0)));
        assert_eq!(parse_size("0x600"), None);
        assert_eq!(parse_size("wide"), None);
    }

    #[test]
    fn summary_lists_frames_and_contents() {
        let style = ShapeStyle::default();
        let shapes = ShapesState::new()
            .reduce(ShapeAction::AddShape(Shape::new(
                ShapeId::intern("hero"),
                &style,
                ShapeKind::Frame {
                    bounds: Bounds::new(0.0, 0.0, 400.0, 300.0),
                    frame_number: 0,
                },
            )))
            .reduce(ShapeAction::AddShape(Shape::new(
                ShapeId::intern("cta"),
                &style,
                ShapeKind::Rect {
                    bounds: Bounds::new(10.0, 10.0, 50.0, 20.0),
                },
            )));
        let doc = CanvasDocument::new(ViewportState::new(&ViewportConfig::default()), shapes);
        let text = summarize(&doc, Size::new(800.0, 600.0));
        assert!(text.contains("shapes: 2"));
        assert!(text.contains("frame #1 `hero`"));
        assert!(text.contains("  rect `cta`"));
        assert!(text.contains("next frame number: 2"));
        assert!(text.contains("fit 800x600: scale 1.000"));
    }

    #[test]
    fn empty_canvas_has_nothing_to_fit() {
        let text = summarize(&CanvasDocument::default(), Size::default());
        assert!(text.contains("shapes: 0"));
        assert!(text.contains("fit: empty canvas"));
    }
}
