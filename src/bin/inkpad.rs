use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "inkpad", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a canvas document as a PNG.
    Render(RenderArgs),
    /// Print a summary of a canvas document.
    Inspect(InspectArgs),
    /// Run an erase gesture over a document and write the flattened result.
    Erase(EraseArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct EraseArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output canvas document JSON (flattened).
    #[arg(long)]
    out: PathBuf,

    /// Gesture start, as X,Y.
    #[arg(long)]
    from: String,

    /// Gesture end, as X,Y.
    #[arg(long)]
    to: String,

    /// Brush width (cutout radius is twice this).
    #[arg(long, default_value_t = 3.0)]
    width: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Erase(args) => cmd_erase(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<(inkpad::CanvasDocument, String)> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: inkpad::CanvasDocument =
        serde_json::from_reader(r).with_context(|| "parse canvas document JSON")?;
    doc.validate()?;
    let json = doc.to_json()?;
    Ok((doc, json))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (doc, _) = read_document(&args.in_path)?;

    let pixmap = inkpad::raster::rasterize_document(&doc)?;
    let mut rgba = pixmap.data().to_vec();
    inkpad::composite::unpremultiply_rgba8_in_place(&mut rgba);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &rgba,
        pixmap.width(),
        pixmap.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let (doc, _) = read_document(&args.in_path)?;

    println!("version:    {}", doc.version);
    println!("size:       {}x{}", doc.width, doc.height);
    println!(
        "background: {}",
        doc.background
            .map(|c| c.to_hex())
            .unwrap_or_else(|| "transparent".to_string())
    );
    println!("objects:    {}", doc.objects.len());
    for (index, object) in doc.objects.iter().enumerate() {
        match object {
            inkpad::CanvasObject::Path(p) => println!(
                "  [{index}] path   {} points, width {}, color {}",
                p.points.len(),
                p.width,
                p.color.to_hex()
            ),
            inkpad::CanvasObject::Image(i) => println!(
                "  [{index}] image  {}x{} at ({}, {}), {} payload bytes",
                i.width,
                i.height,
                i.left,
                i.top,
                i.png_base64.len()
            ),
        }
    }
    Ok(())
}

fn cmd_erase(args: EraseArgs) -> anyhow::Result<()> {
    let (doc, json) = read_document(&args.in_path)?;
    let from = parse_point(&args.from).context("parse --from")?;
    let to = parse_point(&args.to).context("parse --to")?;

    let saved: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let sink = {
        let saved = saved.clone();
        move |document: &str| {
            *saved.borrow_mut() = Some(document.to_string());
        }
    };

    let mut canvas = inkpad::DrawingCanvas::with_size(doc.width, doc.height, Some(&json), sink)?;
    canvas.set_brush_width(args.width);
    canvas.set_mode(inkpad::ToolMode::Erase);
    canvas.handle_pointer(inkpad::PointerEvent::down(from.0, from.1));
    canvas.handle_pointer(inkpad::PointerEvent::moved(to.0, to.1));
    canvas.handle_pointer(inkpad::PointerEvent::up(to.0, to.1));

    let flattened = saved
        .borrow_mut()
        .take()
        .context("erase gesture did not produce a flattened document")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, flattened)
        .with_context(|| format!("write document '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn parse_point(s: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("point '{s}' must be X,Y"))?;
    Ok((
        x.trim().parse().with_context(|| format!("bad X in '{s}'"))?,
        y.trim().parse().with_context(|| format!("bad Y in '{s}'"))?,
    ))
}
