use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use zul_gallery::config::{self, GalleryConfig};
use zul_gallery::embed::{Embedder, PageAssets, Viewer};
use zul_gallery::output;
use zul_gallery::store::{
    self, DataFile, GalleryFilter, GalleryStore, ImageFilter, ImageStore, MemoryStore,
};
use zul_gallery::types::{Gallery, GallerySource, Status};

#[derive(Parser)]
#[command(name = "zul-gallery")]
#[command(about = "Resolve and render image galleries")]
#[command(long_about = "\
Resolve and render image galleries

Galleries, images, and media assets live in one JSON data file:

  {
    \"galleries\": [{ \"id\": 1, \"title\": \"Harbor\" }],
    \"images\": [
      { \"gallery_id\": 1, \"attachment_id\": 123, \"title\": \"Dawn\" },
      { \"gallery_id\": 1, \"attachment_url\": \"https://example.com/pier.jpg\" }
    ],
    \"media\": [
      { \"id\": 123, \"alt\": \"Dawn over the bay\",
        \"sizes\": { \"full\": \"/uploads/dawn.jpg\", \"medium\": \"/uploads/dawn-300x200.jpg\" } }
    ]
  }

Image source resolution (first match wins):
  attachment_id set   → media library, URL per size token
  attachment_url only → external URL, same URL for every size
  neither             → unresolvable (skipped or fatal per [embed] batch)

Pages embed galleries with directives:
  [zul_gallery id=1 columns=4 show_captions=no renderer=fancybox]

Run 'zul-gallery gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Data file with galleries, images, and media
    #[arg(long, default_value = "data.json", global = true)]
    data: PathBuf,

    /// Config file (stock defaults when absent)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that render for a viewer.
#[derive(clap::Args, Clone)]
struct ViewerArgs {
    /// Render as an administrator (errors are shown inline)
    #[arg(long)]
    admin: bool,
}

impl ViewerArgs {
    fn viewer(&self) -> Viewer {
        if self.admin {
            Viewer::Administrator
        } else {
            Viewer::Visitor
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List galleries
    List {
        /// Only galleries with this status (active, inactive, draft)
        #[arg(long)]
        status: Option<String>,
        /// Only galleries from this source (WP, External)
        #[arg(long)]
        source: Option<String>,
        /// Case-insensitive match on title or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a gallery's images and how each one resolves
    Show {
        id: u64,
    },
    /// Render one gallery as an HTML fragment
    Render {
        id: u64,
        /// Grid columns (clamped to 1-6)
        #[arg(long)]
        columns: Option<i64>,
        /// Renderer id (falls back to the default)
        #[arg(long)]
        renderer: Option<String>,
        /// Maximum number of images (at least 1)
        #[arg(long)]
        limit: Option<NonZeroUsize>,
        /// Hide image captions
        #[arg(long)]
        no_captions: bool,
        #[command(flatten)]
        viewer: ViewerArgs,
    },
    /// Expand gallery directives in a text file into a full HTML page
    Page {
        file: PathBuf,
        /// Document title
        #[arg(long, default_value = "Gallery")]
        title: String,
        #[command(flatten)]
        viewer: ViewerArgs,
    },
    /// Add media-library assets to a gallery and save the data file
    AddImages {
        gallery: u64,
        /// Asset ids; unknown or non-image assets are skipped
        #[arg(required = true)]
        assets: Vec<u64>,
        /// User recorded as the images' creator
        #[arg(long, default_value_t = 1)]
        user: u64,
    },
    /// List registered renderers
    Renderers,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::List {
            status,
            source,
            search,
        } => {
            let config = config::load_config(&cli.config)?;
            let embedder = load_embedder(&cli.data, config)?;
            let filter = GalleryFilter {
                status: status.as_deref().map(Status::from_str_lossy),
                source: source.as_deref().map(GallerySource::from_str_lossy),
                search,
                ..GalleryFilter::default()
            };
            let galleries = with_image_counts(embedder.store(), &filter)?;
            output::print_gallery_list(&galleries);
        }
        Command::Show { id } => {
            let config = config::load_config(&cli.config)?;
            let embedder = load_embedder(&cli.data, config)?;
            let store = embedder.store();
            let gallery = store
                .find_gallery(id)?
                .ok_or_else(|| format!("Gallery {id} not found"))?;
            let display = &embedder.config().display;
            let filter = ImageFilter {
                sort: display.orderby,
                order: display.order,
                ..ImageFilter::default()
            };
            let images = store.list_images(id, &filter, None, 0)?;
            output::print_gallery_detail(
                &gallery,
                &images,
                embedder.sources(),
                &display.size,
                &display.thumbnail_size,
            );
        }
        Command::Render {
            id,
            columns,
            renderer,
            limit,
            no_captions,
            viewer,
        } => {
            let config = config::load_config(&cli.config)?;
            let embedder = load_embedder(&cli.data, config)?;
            let mut options = embedder.default_options(id);
            if let Some(columns) = columns {
                options.columns = columns;
            }
            if let Some(limit) = limit {
                options.limit = Some(limit.get());
            }
            if no_captions {
                options.show_captions = false;
            }
            options.renderer = renderer;
            let html = embedder.render(&options, viewer.viewer(), &mut PageAssets::new());
            println!("{}", html);
        }
        Command::Page {
            file,
            title,
            viewer,
        } => {
            let config = config::load_config(&cli.config)?;
            let embedder = load_embedder(&cli.data, config)?;
            let text = std::fs::read_to_string(&file)?;
            let page = embedder.expand_page(&text, viewer.viewer());
            println!("{}", page.to_document(&title, embedder.config()));
        }
        Command::AddImages {
            gallery,
            assets,
            user,
        } => {
            let data = DataFile::load(&cli.data).map_err(|e| format!("{}: {e}", cli.data.display()))?;
            let mut records = MemoryStore::from_records(data.galleries, data.images)?;
            let added =
                store::add_images_from_attachments(&mut records, &data.media, gallery, user, &assets)?;
            let (galleries, images) = records.records();
            DataFile {
                galleries,
                images,
                media: data.media,
            }
            .save(&cli.data)?;
            println!(
                "Added {} of {} assets to gallery {gallery}",
                added.len(),
                assets.len()
            );
        }
        Command::Renderers => {
            let config = config::load_config(&cli.config)?;
            let embedder = Embedder::from_data(DataFile::default(), config)?;
            output::print_renderers(embedder.renderers());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_embedder(
    data: &Path,
    config: GalleryConfig,
) -> Result<Embedder<MemoryStore>, Box<dyn std::error::Error>> {
    let data = DataFile::load(data).map_err(|e| format!("{}: {e}", data.display()))?;
    Ok(Embedder::from_data(data, config)?)
}

fn with_image_counts(
    store: &MemoryStore,
    filter: &GalleryFilter,
) -> Result<Vec<(Gallery, usize)>, Box<dyn std::error::Error>> {
    let mut galleries = Vec::new();
    for gallery in store.list_galleries(filter, None, 0)? {
        let count = store.count_images(gallery.id.unwrap_or_default(), &ImageFilter::default())?;
        galleries.push((gallery, count));
    }
    Ok(galleries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["zul-gallery", "render", "1", "--limit", "0"]).is_err());

        let cli = Cli::try_parse_from(["zul-gallery", "render", "1", "--limit", "2"]).unwrap();
        match cli.command {
            Command::Render { limit, .. } => assert_eq!(limit.map(NonZeroUsize::get), Some(2)),
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn add_images_needs_asset_ids() {
        assert!(Cli::try_parse_from(["zul-gallery", "add-images", "1"]).is_err());

        let cli = Cli::try_parse_from(["zul-gallery", "add-images", "1", "123", "124"]).unwrap();
        match cli.command {
            Command::AddImages { gallery, assets, user } => {
                assert_eq!(gallery, 1);
                assert_eq!(assets, vec![123, 124]);
                assert_eq!(user, 1);
            }
            _ => panic!("expected add-images"),
        }
    }
}
