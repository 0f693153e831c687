use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ogham::build::build_site;
use ogham::config::Config;
use ogham::embed::{EmbedProvider, NoEmbeds, TwitterEmbed};
use ogham::listing::{Listing, ListingQuery};
use ogham::markdown::render_with_embeds;
use ogham::pagination::Badge;
use ogham::rank::{related_to, series_of, DEFAULT_RELATED_LIMIT};
use ogham::store::{DirectoryRepository, PostRepository};

/// A markdown blog engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Directory containing `ogham.yaml` (or any directory below it).
    #[arg(long, short, default_value = ".")]
    project: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the feed, the sitemap and the rendered posts.
    Build {
        #[arg(long, short, default_value = "public")]
        output: PathBuf,

        /// Don't fetch tweet embeds.
        #[arg(long)]
        offline: bool,
    },

    /// Print one page of the post list.
    List {
        #[arg(long, short, default_value = "")]
        query: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Print a post's rendered HTML.
    Show {
        slug: String,

        /// Don't fetch tweet embeds.
        #[arg(long)]
        offline: bool,
    },

    /// Print the related posts and series of a post.
    Related { slug: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ogham::logging::init(cli.verbose)?;

    let config = Config::from_directory(&cli.project)?;
    let repository =
        DirectoryRepository::new(&config.posts_directory).include_drafts(config.include_drafts);

    match cli.command {
        Command::Build { output, offline } => {
            std::fs::create_dir_all(&output)
                .with_context(|| format!("Creating output directory `{}`", output.display()))?;
            let summary = build_site(&config, &output, embed_provider(offline)?.as_ref())?;
            info!(posts = summary.posts, "build finished");
        }
        Command::List { query, page } => {
            let posts = repository.load_all()?;
            let query = ListingQuery { q: query, page };
            let listing = Listing::build(&posts, &query, config.page_size);
            for post in &listing.posts {
                println!(
                    "{}\t{} • {}\t{}",
                    post.slug, post.display_date, post.reading.text, post.metadata.title
                );
            }
            println!(
                "{} posts, page {} of {}",
                listing.total_matches, listing.page, listing.total_pages
            );
            if !listing.badges.is_empty() {
                let badges: Vec<String> = listing
                    .badges
                    .iter()
                    .map(|badge| match badge {
                        Badge::Page(n) if *n == listing.page => format!("[{}]", n),
                        Badge::Page(n) => n.to_string(),
                        Badge::Separator => String::from("..."),
                    })
                    .collect();
                println!("{}", badges.join(" "));
            }
        }
        Command::Show { slug, offline } => {
            let post = repository.load_one(&slug)?;
            println!(
                "{}",
                render_with_embeds(&post.body, embed_provider(offline)?.as_ref())
            );
        }
        Command::Related { slug } => {
            let posts = repository.load_all()?;
            let post = repository.load_one(&slug)?;
            for related in related_to(&post, &posts, DEFAULT_RELATED_LIMIT) {
                println!("related\t{}\t{}", related.slug, related.metadata.title);
            }
            for (i, entry) in series_of(&post, &posts).iter().enumerate() {
                println!("series\t{}) {}\t{}", i + 1, entry.title, entry.slug);
            }
        }
    }
    Ok(())
}

fn embed_provider(offline: bool) -> Result<Box<dyn EmbedProvider>> {
    Ok(match offline {
        true => Box::new(NoEmbeds),
        false => Box::new(TwitterEmbed::new()?),
    })
}
