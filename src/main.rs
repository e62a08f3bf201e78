// src/main.rs - terminal front-end for the Daily Juggernaut client
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;

use juggernaut_client::app::{App, AppContext};
use juggernaut_client::config::ClientConfig;
use juggernaut_client::handlers::auth_handlers::{AuthForm, AuthOutcome, FormMode};
use juggernaut_client::handlers::comment_handlers::{CommentThread, SubmitOutcome};
use juggernaut_client::handlers::feed_handlers::{FEED_CATEGORIES, FeedView};
use juggernaut_client::handlers::home_handlers::{HomeView, featured_posts};
use juggernaut_client::handlers::nav_handlers::NavState;
use juggernaut_client::handlers::post_handlers::{DeleteOutcome, PostManager};
use juggernaut_client::handlers::profile_handlers::DashboardView;
use juggernaut_client::handlers::prompt::Prompt;
use juggernaut_client::handlers::search_handlers::{MIN_QUERY_CHARS, UserSearch};
use juggernaut_client::models::route::Route;
use juggernaut_client::render;
use juggernaut_client::repositories::session_store::FileSessionStore;

#[derive(Parser)]
#[command(name = "juggernaut", about = "Daily Juggernaut campus news client")]
struct Cli {
    /// Start in dark mode regardless of DJ_DARK_MODE.
    #[arg(long, global = true)]
    dark: bool,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    Register {
        username: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    Logout,
    /// Featured story and latest news.
    Home,
    Featured,
    Feed {
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    Like {
        post_id: i64,
    },
    Share {
        post_id: i64,
        #[arg(long)]
        to: Option<String>,
    },
    #[command(subcommand)]
    Posts(PostsCommand),
    Comments {
        post_id: i64,
        /// Post a new comment instead of listing.
        #[arg(long)]
        add: Option<String>,
    },
    SearchUsers {
        query: String,
    },
    Dashboard {
        #[arg(long)]
        stats: bool,
    },
    ProfileUpdate {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        birth_date: String,
        #[arg(long, default_value = "")]
        website: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        avatar: Option<PathBuf>,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// Navigate to a path and show where it lands.
    Open {
        path: String,
    },
}

#[derive(Subcommand)]
enum PostsCommand {
    List,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "public")]
        visibility: String,
        /// Save unpublished.
        #[arg(long)]
        draft: bool,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long = "extra")]
        additional_images: Vec<PathBuf>,
    },
    Delete {
        post_id: i64,
    },
}

/// Alerts go to stderr; confirmations read `y`/`N` from stdin.
struct TerminalPrompt {
    assume_yes: bool,
}

impl Prompt for TerminalPrompt {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Navigates to a member view; prints the redirect when not logged in.
fn enter(ctx: &AppContext, route: Route) -> Result<bool> {
    let landed = ctx.navigator.navigate(route)?;
    if landed != route {
        println!("Please sign in first ({} -> {})", route, landed);
        return Ok(false);
    }
    Ok(true)
}

async fn chrome(ctx: &AppContext) -> NavState {
    let mut nav = NavState::new(ctx.clone());
    nav.mount().await;
    println!("{}", render::header(&ctx.theme, Some(&nav)));
    nav
}

async fn submit_auth(ctx: &AppContext, mut form: AuthForm) -> Result<()> {
    match form.submit(ctx).await {
        AuthOutcome::Navigated(route) => {
            println!("{}: ok, now at {}", form.title(), route);
            Ok(())
        }
        AuthOutcome::Failed(_) => bail!("{} failed", form.title()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    info!("API base URL: {}", config.api_url);
    info!("session file: {}", config.session_file.display());

    let session = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let prompt = Arc::new(TerminalPrompt {
        assume_yes: cli.yes,
    });
    let app = App::new(config, session, prompt).context("failed to build http client")?;
    let ctx = app.context();
    if cli.dark && !ctx.theme.dark_mode() {
        app.toggle_theme();
    }

    match cli.command {
        Command::Login { username, password } => {
            let mut form = AuthForm::new(FormMode::Login);
            form.username = username;
            form.password = read_password(password)?;
            submit_auth(&ctx, form).await?;
        }
        Command::Register {
            username,
            password,
            email,
            first_name,
            last_name,
        } => {
            ctx.navigator.navigate(Route::Register)?;
            let mut form = AuthForm::new(FormMode::Register);
            form.username = username;
            form.password = read_password(password)?;
            form.email = email;
            form.first_name = first_name;
            form.last_name = last_name;
            submit_auth(&ctx, form).await?;
        }
        Command::Logout => {
            let landed = ctx.navigator.navigate(Route::Logout)?;
            println!("Logged out, now at {}", landed);
        }
        Command::Home => {
            if enter(&ctx, Route::Home)? {
                let mut home = HomeView::new(ctx.clone());
                let mut nav = NavState::new(ctx.clone());
                futures::join!(nav.mount(), home.fetch_posts());
                println!("{}", render::header(&ctx.theme, Some(&nav)));
                println!("{}", render::home(&home));
                println!("{}", render::mobile_nav(&nav));
            }
        }
        Command::Featured => {
            if enter(&ctx, Route::Home)? {
                let posts = featured_posts(&ctx.api).await?;
                println!("{}", render::post_list(&posts));
            }
        }
        Command::Feed { category, search } => {
            if enter(&ctx, Route::Feed)? {
                let nav = chrome(&ctx).await;
                let mut feed = FeedView::new(ctx.clone());
                feed.query.search = Some(search).filter(|s| !s.is_empty());
                feed.set_category(&category).await;
                let label = FEED_CATEGORIES
                    .iter()
                    .find(|(value, _)| *value == category)
                    .map(|(_, label)| *label)
                    .unwrap_or("Custom Category");
                println!("{}", label);
                println!("{}", render::post_list(&feed.posts));
                println!("{}", render::mobile_nav(&nav));
            }
        }
        Command::Like { post_id } => {
            if enter(&ctx, Route::Home)? {
                let mut home = HomeView::new(ctx.clone());
                home.fetch_posts().await;
                if let Ok(status) = home.handle_like(post_id).await {
                    println!("Post {}: {:?}", post_id, status);
                }
            }
        }
        Command::Share { post_id, to } => {
            if enter(&ctx, Route::Feed)? {
                let mut feed = FeedView::new(ctx.clone());
                let share = feed.share(post_id, to.as_deref()).await?;
                println!("Shared post {} via {}", share.post, share.shared_to);
            }
        }
        Command::Posts(cmd) => {
            if enter(&ctx, Route::Posts)? {
                run_posts(&ctx, cmd).await?;
            }
        }
        Command::Comments { post_id, add } => {
            if enter(&ctx, Route::Feed)? {
                let mut thread = CommentThread::new(ctx.clone(), post_id, Vec::new());
                thread.load().await?;
                thread.toggle();
                if let Some(content) = add {
                    thread.draft = content;
                    match thread.submit().await {
                        SubmitOutcome::Rejected => bail!("comment is empty"),
                        SubmitOutcome::Failed(e) => return Err(e.into()),
                        SubmitOutcome::Posted(_) => {}
                    }
                }
                println!("{}", render::comments(&thread));
            }
        }
        Command::SearchUsers { query } => {
            if enter(&ctx, Route::Feed)? {
                let mut search = UserSearch::new(&ctx);
                search.set_query(&query);
                if query.trim().chars().count() >= MIN_QUERY_CHARS {
                    wait_for_search(&search, &ctx).await;
                }
                println!("{}", render::search(&search));
            }
        }
        Command::Dashboard { stats } => {
            if enter(&ctx, Route::Dashboard)? {
                let nav = chrome(&ctx).await;
                let mut view = DashboardView::new(ctx.clone());
                view.fetch().await;
                if stats {
                    view.fetch_stats().await?;
                }
                println!("{}", render::dashboard(&view));
                println!("{}", render::mobile_nav(&nav));
            }
        }
        Command::ProfileUpdate {
            first_name,
            last_name,
            email,
            bio,
            location,
            birth_date,
            website,
            phone,
            avatar,
            cover,
        } => {
            if enter(&ctx, Route::Dashboard)? {
                let mut view = DashboardView::new(ctx.clone());
                view.fetch().await;
                view.toggle_editing();
                let form = &mut view.form;
                for (field, value) in [
                    (&mut form.first_name, first_name),
                    (&mut form.last_name, last_name),
                    (&mut form.email, email),
                    (&mut form.bio, bio),
                    (&mut form.location, location),
                    (&mut form.birth_date, birth_date),
                    (&mut form.website, website),
                    (&mut form.phone, phone),
                ] {
                    if !value.is_empty() {
                        *field = value;
                    }
                }
                if let Some(path) = avatar {
                    view.pick_avatar(path).await?;
                }
                if let Some(path) = cover {
                    view.pick_cover_photo(path).await?;
                }
                view.submit().await?;
                println!("{}", render::dashboard(&view));
            }
        }
        Command::Open { path } => {
            let landed = ctx.navigator.navigate_path(&path)?;
            println!("{}", render::header(&ctx.theme, None));
            match landed {
                Route::Landing => println!("{}", render::landing()),
                Route::NotFound => println!("404: page not found"),
                other => println!("Now at {}", other),
            }
        }
    }
    Ok(())
}

async fn run_posts(ctx: &AppContext, cmd: PostsCommand) -> Result<()> {
    let mut manager = PostManager::new(ctx.clone());
    match cmd {
        PostsCommand::List => {
            manager.mount().await;
        }
        PostsCommand::Create {
            title,
            content,
            category,
            visibility,
            draft,
            image,
            additional_images,
        } => {
            manager.toggle_create_form();
            manager.form.title = title;
            manager.form.content = content;
            manager.form.category = category;
            manager.form.visibility = visibility;
            manager.form.is_published = !draft;
            if let Some(path) = image {
                manager.pick_main_image(path).await?;
            }
            if !additional_images.is_empty() {
                manager.pick_additional_images(&additional_images).await?;
            }
            let post = manager.create().await?;
            println!("Created post #{}", post.id);
        }
        PostsCommand::Delete { post_id } => match manager.delete(post_id).await {
            DeleteOutcome::Cancelled => println!("Delete cancelled"),
            DeleteOutcome::Deleted => println!("Deleted post #{}", post_id),
            DeleteOutcome::Failed => bail!("could not delete post #{}", post_id),
        },
    }
    println!("{}", render::manager(&manager));
    Ok(())
}

/// Waits out the debounce, then until the detached search lands.
async fn wait_for_search(search: &UserSearch, ctx: &AppContext) {
    tokio::time::sleep(ctx.config.search_debounce).await;
    let deadline = tokio::time::Instant::now() + ctx.config.http_timeout;
    loop {
        let state = search.snapshot();
        if state.open || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
