//! Command handlers

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use api::{ApiClient, ContactRequest, ReportRequest};
use common::{ClientConfig, FileStore, NoticeLevel, NoticeReceiver, notice};
use feed::{Confirmation, FeedController, FeedItem, likes};
use session::{Access, Decision, Navigator, RouteGuard, RoutePaths, SessionStore, SlotKeys};
use tracing::info;

use crate::cli::Command;

/// Navigation for a terminal: there is no view to switch, so say where the
/// user would be sent.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        info!("Navigating to {}", path);
        println!("-> {path}");
    }
}

/// Wired client: session, guard and API over the configured storage
pub struct App {
    store: Arc<SessionStore>,
    guard: RouteGuard,
    api: ApiClient,
}

impl App {
    pub fn bootstrap(config: &ClientConfig) -> Result<Self> {
        let storage = Arc::new(
            FileStore::open(&config.storage_dir).context("Failed to open session storage")?,
        );
        let store = Arc::new(SessionStore::new(storage, SlotKeys::from_config(config)));
        let session = store.initialize();
        info!("Session initialized, logged in: {}", session.is_logged_in);

        let guard = RouteGuard::new(store.clone(), RoutePaths::from_config(config));
        let api = ApiClient::new(config, store.clone())?;
        Ok(Self { store, guard, api })
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        if let Command::Logout = command {
            self.guard.logout(&TerminalNavigator);
            println!("Logged out.");
            return Ok(());
        }

        let access = if command.requires_session() {
            Access::Protected
        } else {
            Access::PublicOnly
        };
        if let Decision::RedirectTo(path) = self.guard.authorize(access) {
            TerminalNavigator.navigate(&path);
            match access {
                Access::Protected => bail!("Not logged in. Run `snapfeed login` first."),
                Access::PublicOnly => {
                    println!("Already logged in. Run `snapfeed logout` to switch user.");
                    return Ok(());
                }
            }
        }

        match command {
            Command::Login { username, password } => {
                let login = self.api.login(&username, &password).await?;
                println!("Logged in as {}.", login.user.username);
            }
            Command::Logout => {}
            Command::Whoami => {
                let user = self.api.refresh_profile().await?;
                let verified = if user.is_verified { " (verified)" } else { "" };
                println!(
                    "{}{} [{}]",
                    user.username,
                    verified,
                    user.name.as_deref().unwrap_or("-")
                );
            }
            Command::Feed => {
                let user_id = self.current_user_id().await?;
                let mut lists = self.api.feed().await?;
                likes::derive_liked_by_user(&mut lists, &user_id);
                for item in lists.iter() {
                    print_item(item, &user_id);
                }
                if lists.is_empty() {
                    println!("Your feed is empty.");
                }
            }
            Command::Like { post_id } => self.toggle_like(&post_id).await?,
            Command::Comment { post_id, text } => self.comment(&post_id, &text).await?,
            Command::Comments { post_id } => {
                for comment in self.api.comments(&post_id).await? {
                    println!("{}: {}", comment.user.username, comment.text);
                }
            }
            Command::Likers { post_id } => {
                for user in self.api.likers(&post_id).await? {
                    println!("{}", user.username);
                }
            }
            Command::Report {
                post_id,
                reason,
                details,
            } => {
                let ack = self
                    .api
                    .report_post(&ReportRequest {
                        post_id,
                        reason,
                        details,
                    })
                    .await?;
                println!("{}", ack.message.as_deref().unwrap_or("Report submitted."));
            }
            Command::Suggestions => {
                let user_id = self.current_user_id().await?;
                for user in self.api.suggestions(&user_id).await? {
                    println!("{}", user.username);
                }
            }
            Command::Chats => {
                for chat in self.api.chat_users().await? {
                    let unread = if chat.unread_count > 0 {
                        format!(" ({} unread)", chat.unread_count)
                    } else {
                        String::new()
                    };
                    println!(
                        "{}{}: {}",
                        chat.username,
                        unread,
                        chat.last_message.as_deref().unwrap_or("")
                    );
                }
            }
            Command::Search { query } => {
                for user in self.api.search_usernames(&query).await? {
                    println!("{}", user.username);
                }
            }
            Command::Contact {
                subject,
                message,
                email,
            } => {
                let ticket = self
                    .api
                    .contact(&ContactRequest {
                        subject,
                        message,
                        email,
                    })
                    .await?;
                println!("Ticket {} opened.", ticket.complaint_id);
            }
        }
        Ok(())
    }

    async fn current_user_id(&self) -> Result<String> {
        if let Some(user) = self.store.session().user {
            return Ok(user.id);
        }
        Ok(self.api.refresh_profile().await?.id)
    }

    async fn feed_controller(&self) -> Result<(FeedController<ApiClient>, NoticeReceiver)> {
        let user_id = self.current_user_id().await?;
        let (sender, notices) = notice::channel();
        let controller = FeedController::new(self.api.clone(), user_id, sender);
        controller.load(self.api.feed().await?);
        Ok((controller, notices))
    }

    async fn toggle_like(&self, post_id: &str) -> Result<()> {
        let (controller, mut notices) = self.feed_controller().await?;
        let pending = controller.toggle_like(post_id)?;
        let liked = controller
            .state()
            .find(post_id)
            .map(|item| item.liked_by_user)
            .unwrap_or_default();
        println!("{} {}...", if liked { "Liking" } else { "Unliking" }, post_id);

        let outcome = pending.outcome().await;
        while let Ok(notice) = notices.try_recv() {
            print_notice(notice.level, &notice.message);
        }
        match outcome {
            Confirmation::Confirmed => println!("Done."),
            Confirmation::RolledBack => bail!("The server refused the change."),
            Confirmation::Superseded | Confirmation::Discarded => {}
        }
        Ok(())
    }

    async fn comment(&self, post_id: &str, text: &str) -> Result<()> {
        let (controller, mut notices) = self.feed_controller().await?;
        let result = controller.post_comment(post_id, text).await;
        while let Ok(notice) = notices.try_recv() {
            print_notice(notice.level, &notice.message);
        }
        result?;

        let count = controller
            .state()
            .find(post_id)
            .map(|item| item.comment_count);
        match count {
            Some(count) => println!("Comment posted, {count} comments now."),
            None => println!("Comment posted."),
        }
        Ok(())
    }
}

fn print_item(item: &FeedItem, user_id: &str) {
    let heart = if item.liked_by_user { "♥" } else { "♡" };
    println!(
        "[{}] {} by {} {} {} likes, {} comments{}",
        item.id,
        item.caption.as_deref().unwrap_or(""),
        item.author.username,
        heart,
        item.likes.len(),
        item.comment_count,
        if item.author.id == user_id { " (yours)" } else { "" }
    );
}

fn print_notice(level: NoticeLevel, message: &str) {
    match level {
        NoticeLevel::Info => println!("{message}"),
        NoticeLevel::Error => eprintln!("error: {message}"),
    }
}
