//! Command-line surface for the admin client. `run` is extracted from
//! `main` so integration tests can drive it directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::auth::AuthApi;
use crate::contract::{LoginRedirect, SessionStore};
use crate::form::PublicationDraft;
use crate::http::ApiClient;
use crate::imaging;
use crate::load_config::load_config;
use crate::markdown;
use crate::publications::PublicationApi;
use crate::session::FileSessionStore;
use crate::upload::{ImageUploadService, SelectedFile, UploadResult};
use crate::widget::{PreviewRegistry, UploadState, UploadWidget, WidgetConfig};

/// CLI for pubdesk: manage publications and images on the newsletter backend.
#[derive(Parser)]
#[clap(
    name = "pubdesk",
    version,
    about = "Admin client for the publications/newsletter backend"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and persist the session token
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Upload an image, optionally scaling it to fit bounds first
    Upload {
        file: PathBuf,
        #[clap(long)]
        max_width: Option<u32>,
        #[clap(long)]
        max_height: Option<u32>,
        /// JPEG quality used when scaling (1-100)
        #[clap(long, default_value_t = 80)]
        quality: u8,
    },
    /// Delete a previously uploaded image by its public id
    DeleteImage { public_id: String },
    /// Validate and submit a draft from a YAML file
    Publish {
        #[clap(long)]
        draft: PathBuf,
        /// Upload this image first and attach it to the draft
        #[clap(long)]
        image: Option<PathBuf>,
        /// Update this publication instead of creating a new one
        #[clap(long)]
        id: Option<String>,
    },
    /// Render a draft's markdown preview to stdout
    Preview {
        #[clap(long)]
        draft: PathBuf,
    },
    /// List publications
    List,
}

/// Points the user back at the login command when the backend rejects the
/// session.
struct CliLoginRedirect;

impl LoginRedirect for CliLoginRedirect {
    fn redirect_to_login(&self) {
        eprintln!("Your session has expired. Run `pubdesk login` to sign in again.");
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let client = ApiClient::new(&config, Arc::clone(&store), Arc::new(CliLoginRedirect))?;

    match cli.command {
        Commands::Login { email, password } => {
            let auth = AuthApi::new(client, store);
            let session = auth.login(&email, &password).await?;
            println!("Signed in as {}", session.user.email);
        }
        Commands::Logout => {
            AuthApi::new(client, store).logout();
            println!("Signed out.");
        }
        Commands::Upload {
            file,
            max_width,
            max_height,
            quality,
        } => {
            let result = upload_with_widget(&client, &file, max_width, max_height, quality).await?;
            println!("{}", result.image_url);
            if let Some(public_id) = result.public_id {
                println!("public id: {public_id}");
            }
        }
        Commands::DeleteImage { public_id } => {
            ImageUploadService::new(client)
                .delete_image(&public_id)
                .await?;
            println!("Deleted {public_id}.");
        }
        Commands::Publish { draft, image, id } => {
            let mut draft = read_draft(&draft)?;
            if let Some(image_path) = image {
                let uploaded = upload_with_widget(&client, &image_path, None, None, 80).await?;
                draft.set_image(&uploaded);
            }
            let api = PublicationApi::new(client);
            let published = match id {
                Some(id) => draft.submit_update(&api, &id).await?,
                None => draft.submit(&api).await?,
            };
            println!("Published \"{}\" (id {})", published.title, published.id);
        }
        Commands::Preview { draft } => {
            let draft = read_draft(&draft)?;
            println!("{}", markdown::render_preview(&draft.content));
        }
        Commands::List => {
            let api = PublicationApi::new(client);
            for publication in api.list().await? {
                println!(
                    "{}  {}  {}",
                    publication.id,
                    publication.valid_from.date_naive(),
                    publication.title
                );
            }
        }
    }
    Ok(())
}

fn read_draft(path: &Path) -> Result<PublicationDraft> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read draft {:?}: {e}", path))?;
    serde_yaml::from_str(&raw).map_err(|e| anyhow::anyhow!("Failed to parse draft YAML: {e}"))
}

/// Drive an upload through the widget state machine, showing simulated
/// progress until the transport confirms completion.
async fn upload_with_widget(
    client: &ApiClient,
    path: &Path,
    max_width: Option<u32>,
    max_height: Option<u32>,
    quality: u8,
) -> Result<UploadResult> {
    let mut file = SelectedFile::from_path(path)?;
    if max_width.is_some() || max_height.is_some() {
        let bytes = imaging::resize_to_fit(
            &file.bytes,
            max_width.unwrap_or(u32::MAX),
            max_height.unwrap_or(u32::MAX),
            quality,
        )?;
        let stem = Path::new(&file.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        file = SelectedFile::new(format!("{stem}.jpg"), "image/jpeg", bytes);
    }

    let registry = PreviewRegistry::new();
    let mut widget = UploadWidget::new(WidgetConfig::default());
    widget.file_selected(Some(registry.register(imaging::preview_data_url(&file))));

    let service = ImageUploadService::new(client.clone());
    let upload_file = file.clone();
    let mut task = tokio::spawn(async move { service.upload(&upload_file).await });
    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    let result = loop {
        tokio::select! {
            _ = ticker.tick() => {
                widget.tick();
                if let UploadState::Uploading { progress } = widget.state() {
                    eprint!("\ruploading {progress:>3}%");
                }
            }
            joined = &mut task => {
                match joined? {
                    Ok(result) => {
                        widget.upload_succeeded(result.clone());
                        eprintln!("\ruploading 100%");
                        break result;
                    }
                    Err(e) => {
                        widget.upload_failed(e.to_string());
                        eprintln!();
                        widget.teardown();
                        return Err(e.into());
                    }
                }
            }
        }
    };
    widget.teardown();
    Ok(result)
}
