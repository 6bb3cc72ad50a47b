mod activity;
mod auth;
mod community;
mod config;
mod error;
mod export;
mod lifecycle;
mod query;
mod state;
mod storage;
mod types;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::lifecycle::{BulkAction, NewIssue};
use crate::query::{IssueQuery, QueryOutcome, Ranked};
use crate::state::AppState;
use crate::storage::sqlite::SqliteStorage;
use crate::types::{
    Contact, Coordinate, ImageBlob, Issue, NotifyPrefs, Site, SiteDetail, Status, Urgency,
    MAX_IMAGES,
};

#[derive(Parser)]
#[command(name = "ct")]
#[command(about = "CivicTrack - a local-first civic issue tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database path (default: civictrack.db)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report a new issue
    Report {
        /// Issue title
        title: String,

        /// Category (e.g. "Roads & Transportation")
        #[arg(short, long)]
        category: String,

        /// Issue description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Location label
        #[arg(short, long)]
        location: String,

        /// Location latitude
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Location longitude
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Nearby landmark
        #[arg(long)]
        landmark: Option<String>,

        /// Administrative ward
        #[arg(long)]
        ward: Option<String>,

        /// Urgency (low|medium|high|critical)
        #[arg(short, long, default_value = "medium")]
        urgency: String,

        /// File the report anonymously
        #[arg(long)]
        anonymous: bool,

        /// Contact name
        #[arg(long)]
        contact_name: Option<String>,

        /// Contact email
        #[arg(long)]
        contact_email: Option<String>,

        /// Contact phone
        #[arg(long)]
        contact_phone: Option<String>,

        /// Request status updates by email
        #[arg(long)]
        notify_email: bool,

        /// Request status updates by SMS
        #[arg(long)]
        notify_sms: bool,

        /// Attach an image file (repeatable, up to 5)
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// Link to video evidence
        #[arg(long)]
        video_url: Option<String>,

        /// Date first observed (YYYY-MM-DD)
        #[arg(long)]
        first_observed: Option<String>,

        /// How often the problem recurs
        #[arg(long)]
        recurring: Option<String>,

        /// Mark as a safety hazard
        #[arg(long)]
        safety_hazard: bool,
    },

    /// List issues
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by urgency
        #[arg(short, long)]
        urgency: Option<String>,

        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,

        /// Only issues within this many km of the saved location
        #[arg(long)]
        within: Option<f64>,

        /// Only issues beyond this many km of the saved location
        #[arg(long)]
        beyond: Option<f64>,

        /// Order nearest first
        #[arg(long)]
        sort_distance: bool,

        /// The "local issues" view: the configured distance ring, nearest first
        #[arg(long)]
        local: bool,

        /// Limit number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show issue details
    Show {
        /// Issue ID
        id: String,
    },

    /// Update an issue's status (admin)
    UpdateStatus {
        /// Issue ID
        id: String,

        /// New status (reported|under-review|in-progress|resolved)
        status: String,

        /// Note for the action trail
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Override an issue's urgency (admin)
    SetUrgency {
        /// Issue ID
        id: String,

        /// New urgency (low|medium|high|critical)
        urgency: String,
    },

    /// Upvote an issue
    Upvote {
        /// Issue ID
        id: String,
    },

    /// Flag an issue for review
    Flag {
        /// Issue ID
        id: String,
    },

    /// Permanently delete an issue (admin)
    Delete {
        /// Issue ID
        id: String,

        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },

    /// Apply one action to several issues at once (admin)
    Bulk {
        /// Action (in-progress|resolved|delete)
        action: String,

        /// Issue IDs
        ids: Vec<String>,

        /// Skip the confirmation check (required for delete)
        #[arg(long)]
        yes: bool,
    },

    /// Dashboard statistics
    Stats,

    /// Recent admin actions (admin)
    Log {
        /// Limit number of entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Your recent activity
    Activity {
        /// Limit number of entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create an account and log in
    Signup {
        username: String,

        #[arg(short, long)]
        password: String,

        /// Role (citizen|admin)
        #[arg(short, long, default_value = "citizen")]
        role: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Log in
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the current session
    Whoami,

    /// Update your profile
    Profile {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Community feed
    Community {
        #[command(subcommand)]
        command: CommunityCommands,
    },

    /// Export your data (or one issue) as JSON
    Export {
        /// Export a single issue instead of the user bundle
        #[arg(long)]
        issue: Option<String>,

        /// Output directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Save your coordinate for distance filtering
    Locate {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },

    /// Set or toggle the UI theme
    Theme {
        /// light|dark (omit to toggle)
        theme: Option<String>,
    },

    /// Load sample issues into an empty store
    Seed,
}

#[derive(Subcommand)]
enum CommunityCommands {
    /// Share a post
    Post {
        /// Post text
        #[arg(default_value = "")]
        content: String,

        /// Attach an image file
        #[arg(long)]
        image: Option<PathBuf>,

        /// Attach your saved location
        #[arg(long)]
        with_location: bool,
    },

    /// List posts, newest first
    List,

    /// Like a post
    Like {
        /// Post ID
        id: String,
    },

    /// Comment on a post
    Comment {
        /// Post ID
        id: String,

        /// Comment text
        text: String,
    },

    /// Delete your post
    Delete {
        /// Post ID
        id: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    let storage = SqliteStorage::new(PathBuf::from(db_path))?;
    let mut state = AppState::open(Box::new(storage), config)?;

    match cli.command {
        Commands::Report {
            title,
            category,
            description,
            location,
            lat,
            lng,
            landmark,
            ward,
            urgency,
            anonymous,
            contact_name,
            contact_email,
            contact_phone,
            notify_email,
            notify_sms,
            images,
            video_url,
            first_observed,
            recurring,
            safety_hazard,
        } => {
            if images.len() > MAX_IMAGES {
                bail!("at most {MAX_IMAGES} images are allowed");
            }
            let coordinate = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
                (None, None) => None,
                _ => bail!("--lat and --lng must be given together"),
            };
            let specific_location = match (landmark, ward) {
                (None, None) => None,
                (landmark, ward) => Some(SiteDetail {
                    landmark: landmark.unwrap_or_default(),
                    ward: ward.unwrap_or_default(),
                }),
            };
            let contact = contact_email.map(|email| Contact {
                name: contact_name.unwrap_or_default(),
                email,
                phone: contact_phone.unwrap_or_default(),
                notify: NotifyPrefs {
                    email: notify_email,
                    sms: notify_sms,
                },
            });
            let first_observed = first_observed
                .map(|d| {
                    d.parse::<NaiveDate>()
                        .with_context(|| format!("invalid date: {d}"))
                })
                .transpose()?;
            let images = images
                .iter()
                .enumerate()
                .map(|(i, path)| load_image_blob(path, i))
                .collect::<Result<Vec<_>>>()?;

            let issue = lifecycle::create(
                &mut state,
                NewIssue {
                    title,
                    category,
                    description,
                    location: Site::new(location, coordinate),
                    specific_location,
                    urgency: urgency.parse()?,
                    anonymous,
                    first_observed,
                    recurring,
                    safety_hazard,
                    images,
                    video_url,
                    contact,
                },
            )?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&issue)?);
            } else {
                println!("{} Issue reported: {}", "✓".green(), issue.id.bold());
                println!("  Estimated response time: {}", response_time(issue.urgency));
            }
            Ok(())
        }

        Commands::List {
            status,
            category,
            urgency,
            search,
            within,
            beyond,
            sort_distance,
            local,
            limit,
        } => {
            let mut q = if local {
                IssueQuery::local(state.config.min_distance_km, state.config.max_distance_km)
            } else {
                IssueQuery::default()
            };
            if let Some(s) = status {
                q.status = Some(s.parse()?);
            }
            if let Some(u) = urgency {
                q.urgency = Some(u.parse::<Urgency>()?);
            }
            q.category = category;
            q.search = search;
            if within.is_some() {
                q.max_km = within;
            }
            if beyond.is_some() {
                q.min_km = beyond;
            }
            if sort_distance {
                q.sort_by_distance = true;
            }

            let viewer = state.viewer_location();
            let outcome = query::run(&state.issues, Some(viewer), &q);
            match outcome {
                QueryOutcome::EmptyStore => {
                    if cli.json {
                        println!("[]");
                    } else {
                        println!("No issues reported yet.");
                    }
                }
                QueryOutcome::NoMatches => {
                    if cli.json {
                        println!("[]");
                    } else {
                        println!("No issues match the current filters.");
                    }
                }
                QueryOutcome::Matches(mut ranked) => {
                    if let Some(limit) = limit {
                        ranked.truncate(limit);
                    }
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&ranked)?);
                    } else {
                        for r in &ranked {
                            print_issue_row(r);
                        }
                        let stats = query::quick_stats(&ranked);
                        println!(
                            "\n{} issues, {} urgent, {} resolved",
                            stats.local_issues, stats.urgent, stats.resolved
                        );
                    }
                }
            }
            Ok(())
        }

        Commands::Show { id } => {
            let issue = state
                .find_issue(&id)
                .ok_or_else(|| error::CtError::IssueNotFound(id.clone()))?
                .clone();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&issue)?);
            } else {
                print_issue_detail(&state, &issue);
            }
            Ok(())
        }

        Commands::UpdateStatus { id, status, note } => {
            state.require_admin()?;
            let change =
                lifecycle::update_status(&mut state, &id, status.parse()?, note.as_deref())?;
            println!(
                "{} {} status: {} -> {}",
                "✓".green(),
                change.issue_id.bold(),
                status_badge(change.old),
                status_badge(change.new)
            );
            Ok(())
        }

        Commands::SetUrgency { id, urgency } => {
            state.require_admin()?;
            let issue = lifecycle::set_urgency(&mut state, &id, urgency.parse()?)?;
            println!(
                "{} {} urgency set to {}",
                "✓".green(),
                issue.id.bold(),
                urgency_badge(issue.urgency)
            );
            Ok(())
        }

        Commands::Upvote { id } => {
            state.require_session()?;
            let issue = lifecycle::upvote(&mut state, &id)?;
            println!(
                "{} {} now has {} upvotes ({})",
                "✓".green(),
                issue.id.bold(),
                issue.upvotes,
                urgency_badge(issue.urgency)
            );
            Ok(())
        }

        Commands::Flag { id } => {
            state.require_session()?;
            let issue = lifecycle::flag(&mut state, &id)?;
            println!(
                "{} {} flagged for review ({} flags)",
                "⚑".yellow(),
                issue.id.bold(),
                issue.flags
            );
            Ok(())
        }

        Commands::Delete { id, yes } => {
            state.require_admin()?;
            if !yes {
                bail!("deleting an issue cannot be undone; pass --yes to confirm");
            }
            lifecycle::delete(&mut state, &id)?;
            println!("{} Issue {} deleted", "✓".green(), id.bold());
            Ok(())
        }

        Commands::Bulk { action, ids, yes } => {
            state.require_admin()?;
            if ids.is_empty() {
                bail!("no issue ids given");
            }
            let action: BulkAction = action.parse()?;
            if action == BulkAction::Delete && !yes {
                bail!("bulk delete cannot be undone; pass --yes to confirm");
            }
            let outcome = lifecycle::bulk(&mut state, &ids, action)?;
            println!(
                "{} Applied to {} issue(s)",
                "✓".green(),
                outcome.applied.len()
            );
            for id in &outcome.missing {
                println!("{} {} not found", "!".yellow(), id);
            }
            Ok(())
        }

        Commands::Stats => {
            let stats = query::admin_stats(&state.issues);
            let local = IssueQuery::local(state.config.min_distance_km, state.config.max_distance_km);
            let outcome = query::run(&state.issues, Some(state.viewer_location()), &local);
            let quick = query::quick_stats(outcome.matches());

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "dashboard": stats,
                        "local": quick,
                    }))?
                );
            } else {
                println!("{}", "Dashboard".bold());
                println!("  Total:        {}", stats.total_issues);
                println!("  Reported:     {}", stats.reported);
                println!("  Under Review: {}", stats.under_review);
                println!("  In Progress:  {}", stats.in_progress);
                println!("  Resolved:     {}", stats.resolved);
                println!("{}", "Nearby".bold());
                println!("  Local issues: {}", quick.local_issues);
                println!("  Urgent:       {}", quick.urgent);
                println!("  Resolved:     {}", quick.resolved);
            }
            Ok(())
        }

        Commands::Log { limit } => {
            state.require_admin()?;
            let log = activity::recent_admin_actions(&state, limit)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&log)?);
            } else if log.is_empty() {
                println!("No admin actions recorded.");
            } else {
                for entry in &log {
                    println!(
                        "{}  {}  {}  {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.admin_name.as_deref().unwrap_or("-").bold(),
                        entry.issue_id,
                        entry.description
                    );
                }
            }
            Ok(())
        }

        Commands::Activity { limit } => {
            let log = activity::recent_activities(&state, limit)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&log)?);
            } else if log.is_empty() {
                println!("No recent activity.");
            } else {
                for entry in &log {
                    println!(
                        "{}  {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.description
                    );
                }
            }
            Ok(())
        }

        Commands::Signup {
            username,
            password,
            role,
            first_name,
            last_name,
            email,
        } => {
            let session = auth::signup(
                &mut state,
                auth::NewUser {
                    username,
                    password,
                    role: role.parse()?,
                    first_name: first_name.unwrap_or_default(),
                    last_name: last_name.unwrap_or_default(),
                    email: email.unwrap_or_default(),
                },
            )?;
            println!("{} Account created. Welcome, {}!", "✓".green(), session.username);
            Ok(())
        }

        Commands::Login { username, password } => {
            let session = auth::login(&mut state, &username, &password)?;
            println!(
                "{} Welcome, {}! ({})",
                "✓".green(),
                session.username,
                session.role
            );
            Ok(())
        }

        Commands::Logout => {
            auth::logout(&mut state)?;
            println!("Logged out.");
            Ok(())
        }

        Commands::Whoami => {
            match &state.session {
                Some(session) if cli.json => {
                    println!("{}", serde_json::to_string_pretty(session)?)
                }
                Some(session) => println!("{} ({})", session.display_name(), session.role),
                None => println!("Not logged in."),
            }
            Ok(())
        }

        Commands::Profile {
            first_name,
            last_name,
            email,
        } => {
            let session = auth::update_profile(
                &mut state,
                auth::ProfileUpdate {
                    first_name,
                    last_name,
                    email,
                },
            )?;
            println!("{} Profile updated for {}", "✓".green(), session.display_name());
            Ok(())
        }

        Commands::Community { command } => run_community(&mut state, cli.json, command),

        Commands::Export { issue, dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(state.config.export_dir.clone()));
            match issue {
                Some(id) => {
                    let issue = state
                        .find_issue(&id)
                        .ok_or_else(|| error::CtError::IssueNotFound(id.clone()))?
                        .clone();
                    let path = export::export_issue(&issue, &dir)?;
                    if state.session.as_ref().is_some_and(|s| s.is_admin()) {
                        activity::log_admin_action(
                            &mut state,
                            &id,
                            types::AdminActionKind::Downloaded,
                            "Issue report downloaded",
                        )?;
                    }
                    println!("{} Exported to {}", "✓".green(), path.display());
                }
                None => {
                    let path = export::export_user_data(&mut state, &dir)?;
                    println!("{} Exported to {}", "✓".green(), path.display());
                }
            }
            Ok(())
        }

        Commands::Locate { lat, lng } => {
            state.locate(Coordinate { lat, lng })?;
            println!(
                "Located at {} - showing issues within {} km",
                state.viewer_location(),
                state.config.max_distance_km
            );
            Ok(())
        }

        Commands::Theme { theme } => {
            let next = match theme {
                Some(t) => {
                    let t = t.parse()?;
                    state.set_theme(t)?;
                    t
                }
                None => state.toggle_theme()?,
            };
            println!("Theme set to {next}");
            Ok(())
        }

        Commands::Seed => {
            if !state.issues.is_empty() {
                println!(
                    "Store already has {} issue(s); seed skipped.",
                    state.issues.len()
                );
                return Ok(());
            }
            state.issues = demo_issues();
            state.persist_issues()?;
            println!("{} Loaded {} sample issues", "✓".green(), state.issues.len());
            Ok(())
        }
    }
}

fn run_community(state: &mut AppState, json: bool, command: CommunityCommands) -> Result<()> {
    match command {
        CommunityCommands::Post {
            content,
            image,
            with_location,
        } => {
            let image_data = image
                .map(|path| load_image_blob(&path, 0).map(|blob| blob.data))
                .transpose()?;
            let post = community::create_post(state, &content, image_data, with_location)?;
            println!("{} Post shared ({})", "✓".green(), post.id);
            Ok(())
        }
        CommunityCommands::List => {
            let posts = community::list_posts(state)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
                return Ok(());
            }
            if posts.is_empty() {
                println!("No posts yet. Be the first to share something!");
                return Ok(());
            }
            for post in &posts {
                let role = if post.user_role == types::Role::Admin {
                    " [Admin]".cyan().to_string()
                } else {
                    String::new()
                };
                println!(
                    "{}  {}{}  {}",
                    post.id.bold(),
                    post.user_name,
                    role,
                    post.timestamp.format("%Y-%m-%d %H:%M")
                );
                if !post.content.is_empty() {
                    println!("  {}", post.content);
                }
                if let Some(location) = &post.location {
                    println!("  {}", location.dimmed());
                }
                println!(
                    "  {} likes, {} comments",
                    post.likes,
                    post.comments.len()
                );
            }
            let stats = community::community_stats(state)?;
            println!(
                "\n{} members, {} posts, {} resolved this week",
                stats.members, stats.posts, stats.resolved_this_week
            );
            let contributors = community::top_contributors(state)?;
            if !contributors.is_empty() {
                println!("{}", "Top contributors".bold());
                for c in &contributors {
                    println!(
                        "  {}  {} reports, {} posts",
                        c.name, c.issues, c.posts
                    );
                }
            }
            Ok(())
        }
        CommunityCommands::Like { id } => {
            let post = community::like_post(state, &id)?;
            println!("{} Post liked ({} likes)", "✓".green(), post.likes);
            Ok(())
        }
        CommunityCommands::Comment { id, text } => {
            community::add_comment(state, &id, &text)?;
            println!("{} Comment added", "✓".green());
            Ok(())
        }
        CommunityCommands::Delete { id } => {
            community::delete_post(state, &id)?;
            println!("{} Post deleted", "✓".green());
            Ok(())
        }
    }
}

fn print_issue_row(r: &Ranked) {
    let distance = r
        .distance
        .map(|d| format!("  {:.1} km", d))
        .unwrap_or_default();
    println!(
        "{}  {}  [{} | {}]{}",
        r.issue.id.bold(),
        r.issue.title,
        status_badge(r.issue.status),
        urgency_badge(r.issue.urgency),
        distance
    );
    println!(
        "    {}  {}  {}",
        r.issue.category.dimmed(),
        r.issue.location.text.dimmed(),
        r.issue.date.format("%Y-%m-%d").to_string().dimmed()
    );
}

fn print_issue_detail(state: &AppState, issue: &Issue) {
    println!("{} {}", issue.id.bold(), issue.title.bold());
    println!(
        "  Status:   {}   Urgency: {}",
        status_badge(issue.status),
        urgency_badge(issue.urgency)
    );
    println!("  Category: {}", issue.category);
    println!("  Location: {}", issue.location.text);
    if let Some(detail) = &issue.specific_location {
        if !detail.landmark.is_empty() {
            println!("  Landmark: {}", detail.landmark);
        }
        if !detail.ward.is_empty() {
            println!("  Ward:     {}", detail.ward);
        }
    }
    if let Some(coord) = issue.location.coordinate {
        let km = query::haversine_km(state.viewer_location(), coord);
        println!("  Distance: {km:.1} km");
    } else {
        println!("  Distance: unknown");
    }
    if !issue.description.is_empty() {
        println!("  {}", issue.description);
    }
    println!("  Reported by {} on {}", issue.reporter, issue.date.format("%Y-%m-%d"));
    if let Some(resolved) = issue.resolved_date {
        println!("  Resolved on {}", resolved.format("%Y-%m-%d"));
    }
    if let Some(first) = issue.first_observed {
        println!("  First observed {first}");
    }
    if let Some(recurring) = &issue.recurring {
        println!("  Recurring: {recurring}");
    }
    if issue.safety_hazard {
        println!("  {}", "Safety hazard".red());
    }
    if !issue.images.is_empty() {
        println!("  {} image(s) attached", issue.images.len());
    }
    if let Some(url) = &issue.video_url {
        println!("  Video: {url}");
    }
    println!("  {} upvotes, {} flags", issue.upvotes, issue.flags);
    if let Some(contact) = &issue.contact {
        println!("  Contact: {} <{}>", contact.name, contact.email);
    }

    let similar = query::similar_issues(&state.issues, issue);
    if !similar.is_empty() {
        println!("\n  Similar issues:");
        for s in similar {
            println!("    {}  {}  [{}]", s.id, s.title, status_badge(s.status));
        }
    }
}

fn status_badge(status: Status) -> ColoredString {
    match status {
        Status::Resolved => status.as_str().green(),
        Status::InProgress => status.as_str().yellow(),
        Status::UnderReview => status.as_str().cyan(),
        Status::Reported => status.as_str().normal(),
    }
}

fn urgency_badge(urgency: Urgency) -> ColoredString {
    match urgency {
        Urgency::Critical => urgency.as_str().red(),
        Urgency::High => urgency.as_str().yellow(),
        Urgency::Medium => urgency.as_str().cyan(),
        Urgency::Low => urgency.as_str().normal(),
    }
}

fn response_time(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Low => "5-7 days",
        Urgency::Medium => "3-5 days",
        Urgency::High => "1-2 days",
        Urgency::Critical => "within 24 hours",
    }
}

fn demo_issue(
    id: &str,
    title: &str,
    category: &str,
    status: Status,
    urgency: Urgency,
    location: &str,
    reporter: &str,
    upvotes: u32,
) -> Issue {
    let now = chrono::Utc::now();
    Issue {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        category: category.to_string(),
        location: Site::new(location, None),
        specific_location: None,
        status,
        urgency,
        upvotes,
        flags: 0,
        reporter: reporter.to_string(),
        reporter_id: None,
        date: now,
        resolved_date: (status == Status::Resolved).then_some(now),
        first_observed: None,
        recurring: None,
        safety_hazard: false,
        images: Vec::new(),
        video_url: None,
        contact: None,
    }
}

fn demo_issues() -> Vec<Issue> {
    vec![
        demo_issue(
            "CT-201",
            "Broken Streetlight near Central Park",
            "Street Lighting",
            Status::Reported,
            Urgency::High,
            "Central Avenue, Sector 10",
            "Anonymous",
            5,
        ),
        demo_issue(
            "CT-202",
            "Potholes on Main Road",
            "Roads & Transportation",
            Status::InProgress,
            Urgency::Medium,
            "MG Road, Sector 5",
            "Riya Sharma",
            11,
        ),
        demo_issue(
            "CT-203",
            "Overflowing Garbage Bin",
            "Cleanliness & Waste",
            Status::Resolved,
            Urgency::Low,
            "Block B Market, Sector 8",
            "Arjun Mehta",
            18,
        ),
        demo_issue(
            "CT-204",
            "Water Leakage Near School",
            "Water & Drainage",
            Status::UnderReview,
            Urgency::High,
            "Greenfield Public School",
            "Sneha Verma",
            8,
        ),
        demo_issue(
            "CT-205",
            "Broken Traffic Signal",
            "Traffic & Safety",
            Status::Reported,
            Urgency::Critical,
            "Ring Road Junction",
            "Vikas Singh",
            14,
        ),
    ]
}

/// Reads an image file into an inline data-URL blob.
fn load_image_blob(path: &Path, index: usize) -> Result<ImageBlob> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {path:?}"))?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(ImageBlob {
        id: format!("img_{index}"),
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string(),
        data: format!("data:{mime};base64,{}", BASE64.encode(&bytes)),
    })
}
