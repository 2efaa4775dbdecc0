//! Renders one widget markup file to a PNG, without an editor host.
//!
//! ```text
//! craftkit-snapshot <widget.wgt> [--styles DIR] [--out preview.png] [--size WxH]
//! ```
//!
//! The file and any `*.wgt` styles in the styles directory are fed into a
//! [`PreviewSession`] as a synthetic `widgetToPreview` message, exactly as an
//! editor host would. Markup errors therefore still produce an image — the
//! session's inline error panel — while I/O failures exit non-zero.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use craftkit_engine::coords::Vec2;
use craftkit_engine::logging::{init_logging, LoggingConfig};
use craftkit_engine::render::Pixmap;
use craftkit_preview::protocol::HostMessage;
use craftkit_preview::PreviewSession;

const DEFAULT_SIZE: (u32, u32) = (800, 600);

struct Args {
    widget: PathBuf,
    styles: Option<PathBuf>,
    out: PathBuf,
    size: (u32, u32),
}

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let markup = std::fs::read_to_string(&args.widget)
        .with_context(|| format!("reading {}", args.widget.display()))?;
    let styles = match &args.styles {
        Some(dir) => load_styles(dir)?,
        None => HashMap::new(),
    };
    let title = args
        .widget
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let style_count = styles.len();
    let mut session = PreviewSession::new();
    session.handle_message(HostMessage::WidgetToPreview { title, markup, styles });

    let (width, height) = args.size;
    let pixmap = session.render(Vec2::new(width as f32, height as f32));
    write_png(&pixmap, &args.out)?;

    log::info!(
        "wrote {} ({}x{}, {} style(s))",
        args.out.display(),
        width,
        height,
        style_count
    );
    Ok(())
}

// ── Arguments ─────────────────────────────────────────────────────────────────

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut widget = None;
    let mut styles = None;
    let mut out = PathBuf::from("preview.png");
    let mut size = DEFAULT_SIZE;

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--styles" => {
                let dir = argv.next().context("--styles needs a directory")?;
                styles = Some(PathBuf::from(dir));
            }
            "--out" => {
                let path = argv.next().context("--out needs a file path")?;
                out = PathBuf::from(path);
            }
            "--size" => {
                let spec = argv.next().context("--size needs WxH")?;
                size = parse_size(&spec)?;
            }
            "--help" | "-h" => {
                bail!("usage: craftkit-snapshot <widget.wgt> [--styles DIR] [--out preview.png] [--size WxH]")
            }
            other if other.starts_with('-') => bail!("unknown option {other}"),
            other => {
                if widget.replace(PathBuf::from(other)).is_some() {
                    bail!("more than one widget file given");
                }
            }
        }
    }

    Ok(Args {
        widget: widget.context("no widget file given")?,
        styles,
        out,
        size,
    })
}

fn parse_size(spec: &str) -> Result<(u32, u32)> {
    let (w, h) = spec.split_once(['x', 'X']).context("--size must look like 800x600")?;
    let width: u32 = w.parse().with_context(|| format!("bad width {w:?}"))?;
    let height: u32 = h.parse().with_context(|| format!("bad height {h:?}"))?;
    if width == 0 || height == 0 {
        bail!("--size must be non-zero");
    }
    Ok((width, height))
}

// ── Styles ────────────────────────────────────────────────────────────────────

/// Loads every `*.wgt` file in the directory as a style keyed by its stem.
fn load_styles(dir: &Path) -> Result<HashMap<String, String>> {
    let mut styles = HashMap::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading styles from {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("wgt") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading style {}", path.display()))?;
        styles.insert(stem.to_string(), text);
    }
    Ok(styles)
}

// ── Output ────────────────────────────────────────────────────────────────────

fn write_png(pixmap: &Pixmap, out: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixmap.data().to_vec())
        .context("pixmap buffer did not match its dimensions")?;
    image
        .save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_fill_in() {
        let parsed = args(&["Menu.wgt"]).unwrap();
        assert_eq!(parsed.widget, PathBuf::from("Menu.wgt"));
        assert_eq!(parsed.out, PathBuf::from("preview.png"));
        assert_eq!(parsed.size, DEFAULT_SIZE);
        assert!(parsed.styles.is_none());
    }

    #[test]
    fn all_options_parse() {
        let parsed = args(&[
            "Menu.wgt", "--styles", "Styles", "--out", "shot.png", "--size", "320x240",
        ])
        .unwrap();
        assert_eq!(parsed.styles, Some(PathBuf::from("Styles")));
        assert_eq!(parsed.out, PathBuf::from("shot.png"));
        assert_eq!(parsed.size, (320, 240));
    }

    #[test]
    fn bad_invocations_error() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.wgt", "b.wgt"]).is_err());
        assert!(args(&["a.wgt", "--size", "320"]).is_err());
        assert!(args(&["a.wgt", "--size", "0x10"]).is_err());
        assert!(args(&["a.wgt", "--wat"]).is_err());
    }
}
