use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tilemosaic", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a viewport of a tile mosaic as a PNG.
    Render(RenderArgs),
    /// Print each tile's world bounding box as JSON.
    Bounds(BoundsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Tile specs: a JSON array of tiles or a resolved tile collection.
    #[arg(long)]
    tiles: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Viewport origin, world x.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,

    /// Viewport origin, world y.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Output pixels per world unit.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Mesh cell size in source pixels.
    #[arg(long, default_value_t = 64.0)]
    res: f64,

    /// Resampler worker threads.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Align sample centers rather than corners.
    #[arg(long)]
    area_offset: bool,

    /// Nearest-neighbor sampling.
    #[arg(long)]
    skip_interpolation: bool,

    /// Replace saturated black and white with gray noise before resampling.
    #[arg(long)]
    filter: bool,

    /// Threshold mask alpha.
    #[arg(long)]
    binary_mask: bool,

    /// Opaque background color, `RRGGBB`.
    #[arg(long)]
    background: Option<String>,

    /// Raster cache budget in pixels.
    #[arg(long)]
    cache_max_pixels: Option<usize>,
}

#[derive(Parser, Debug)]
struct BoundsArgs {
    /// Tile specs: a JSON array of tiles or a resolved tile collection.
    #[arg(long)]
    tiles: PathBuf,

    /// Mesh cell size in source pixels.
    #[arg(long, default_value_t = 64.0)]
    res: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Bounds(args) => cmd_bounds(args),
    }
}

fn read_tiles(path: &Path) -> anyhow::Result<Vec<tilemosaic::TileSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read tiles '{}'", path.display()))?;
    // A bare array is a tile list; an object is a collection with a shared transform pool.
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(&text)
            .with_context(|| format!("parse tile list JSON '{}'", path.display()));
    }
    let collection: tilemosaic::ResolvedTileCollection = serde_json::from_str(&text)
        .with_context(|| format!("parse tile collection JSON '{}'", path.display()))?;
    collection.validate()?;
    Ok(collection.resolve()?)
}

/// Derive bounds for every tile; tiles that probe to zero size are dropped.
fn tiles_with_bounds(
    tiles: Vec<tilemosaic::TileSpec>,
    mesh_cell_size: f64,
) -> anyhow::Result<Vec<(tilemosaic::TileSpec, tilemosaic::Rect)>> {
    let mut out = Vec::with_capacity(tiles.len());
    for mut tile in tiles {
        match tilemosaic::derive_bounding_box(&mut tile, mesh_cell_size, false) {
            Ok(b) => out.push((tile, b)),
            Err(_) if tile.width == Some(0) || tile.height == Some(0) => {
                tracing::debug!(tile = %tile.tile_id, "dropping zero size tile");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("bounds of tile '{}'", tile.tile_id));
            }
        }
    }
    Ok(out)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let background_rgb = match args.background.as_deref() {
        Some(s) => Some(
            tilemosaic::parse_rgb_hex(s)
                .with_context(|| format!("background '{s}' is not RRGGBB"))?,
        ),
        None => None,
    };
    let request = tilemosaic::RenderRequest {
        x: args.x,
        y: args.y,
        width: args.width,
        height: args.height,
        scale: args.scale,
        mesh_cell_size: args.res,
        area_offset: args.area_offset,
        skip_interpolation: args.skip_interpolation,
        do_filter: args.filter,
        binary_mask: args.binary_mask,
        background_rgb,
        num_threads: args.threads,
    };
    request.validate()?;

    let tiles = read_tiles(&args.tiles)?;
    let total = tiles.len();
    let view = request.world_bounds();
    let visible: Vec<tilemosaic::TileSpec> = tiles_with_bounds(tiles, request.mesh_cell_size)?
        .into_iter()
        .filter(|(_, b)| b.x1 > view.x0 && b.x0 < view.x1 && b.y1 > view.y0 && b.y0 < view.y1)
        .map(|(t, _)| t)
        .collect();
    tracing::info!(total, visible = visible.len(), "culled tiles to viewport");

    let cache_opts = match args.cache_max_pixels {
        Some(n) => tilemosaic::RasterCacheOpts {
            max_cached_pixels: n,
        },
        None => tilemosaic::RasterCacheOpts::default(),
    };
    let cache = tilemosaic::RasterCache::new(cache_opts);
    let filters = if args.filter {
        tilemosaic::FilterPipeline::alignment_default()
    } else {
        tilemosaic::FilterPipeline::new()
    };

    let mut canvas = tilemosaic::Canvas::for_request(&request);
    let stats = tilemosaic::render(&request, &visible, &mut canvas, &cache, &filters)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &canvas.to_rgba8_straight(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    let cache_stats = cache.stats();
    tracing::info!(
        rendered = stats.tiles_rendered,
        skipped = stats.tiles_skipped,
        cache_hits = cache_stats.hits,
        cache_misses = cache_stats.misses,
        "render complete"
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_bounds(args: BoundsArgs) -> anyhow::Result<()> {
    let tiles = read_tiles(&args.tiles)?;
    let entries: Vec<serde_json::Value> = tiles_with_bounds(tiles, args.res)?
        .into_iter()
        .map(|(t, b)| {
            serde_json::json!({
                "tile_id": t.tile_id,
                "width": t.width,
                "height": t.height,
                "bounds": b,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
