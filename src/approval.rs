//! Join-request auto-approval.
//!
//! When someone asks to join a managed chat the bot waits a short delay,
//! skips users who are already members, approves the request and optionally
//! sends a welcome message. Approval can be switched off globally
//! (`/reqmode off`) or per channel (`/approveoff <id>`, stored in the
//! database).
//!
//! Platform calls go through [`ChatModerator`] so the flow can be exercised
//! without Telegram.

use crate::config::ApprovalConfig;
use crate::database::Database;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Approval settings that admins can change at runtime.
#[derive(Debug)]
pub struct ApprovalSettings {
    enabled: AtomicBool,
    wait_secs: AtomicU64,
    welcome: bool,
    welcome_text: String,
    chat_ids: Vec<i64>,
}

impl ApprovalSettings {
    pub fn from_config(config: &ApprovalConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            wait_secs: AtomicU64::new(config.wait_secs),
            welcome: config.welcome,
            welcome_text: config.welcome_text.clone(),
            chat_ids: config.chat_ids.clone(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs.load(Ordering::Relaxed))
    }

    pub fn set_wait_secs(&self, secs: u64) {
        self.wait_secs.store(secs, Ordering::Relaxed);
    }

    /// True if join requests from `chat_id` are handled at all.
    pub fn handles_chat(&self, chat_id: i64) -> bool {
        self.chat_ids.is_empty() || self.chat_ids.contains(&chat_id)
    }
}

/// A pending request to join a chat.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub chat_id: i64,
    pub chat_title: String,
    pub user_id: i64,
    pub user_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Auto-approval is switched off globally.
    Disabled,
    /// The chat is not in the configured allow-list.
    ChatNotHandled,
    /// Auto-approval is switched off for this chat.
    ApprovalOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Skip(SkipReason),
}

/// What [`JoinRequestApprover::process`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    AlreadyMember,
    Approved { welcomed: bool },
    Failed,
}

/// Chat-platform operations needed to approve a request.
#[async_trait]
pub trait ChatModerator: Send + Sync {
    async fn is_member(&self, chat_id: i64, user_id: i64) -> Result<bool>;
    async fn approve(&self, chat_id: i64, user_id: i64) -> Result<()>;
    async fn welcome(&self, request: &JoinRequest, text: &str) -> Result<()>;
}

/// Decides on and processes join requests.
pub struct JoinRequestApprover {
    settings: Arc<ApprovalSettings>,
    db: Arc<Database>,
}

impl JoinRequestApprover {
    pub fn new(settings: Arc<ApprovalSettings>, db: Arc<Database>) -> Self {
        Self { settings, db }
    }

    pub fn settings(&self) -> &ApprovalSettings {
        &self.settings
    }

    pub async fn decide(&self, chat_id: i64) -> Decision {
        if !self.settings.enabled() {
            return Decision::Skip(SkipReason::Disabled);
        }
        if !self.settings.handles_chat(chat_id) {
            return Decision::Skip(SkipReason::ChatNotHandled);
        }
        if self.db.is_approval_off(chat_id).await {
            return Decision::Skip(SkipReason::ApprovalOff);
        }
        Decision::Approve
    }

    /// Waits the configured delay, then approves `request`.
    ///
    /// Platform errors are logged; only a failed approval changes the
    /// outcome.
    pub async fn process<M>(&self, request: &JoinRequest, moderator: &M) -> Outcome
    where
        M: ChatModerator + ?Sized,
    {
        if let Decision::Skip(reason) = self.decide(request.chat_id).await {
            debug!(chat_id = request.chat_id, ?reason, "Skipping join request");
            return Outcome::Skipped(reason);
        }

        let wait = self.settings.wait();
        info!(
            chat_id = request.chat_id,
            user_id = request.user_id,
            wait_secs = wait.as_secs(),
            "Join request received"
        );
        tokio::time::sleep(wait).await;

        match moderator.is_member(request.chat_id, request.user_id).await {
            Ok(true) => {
                info!(
                    chat_id = request.chat_id,
                    user_id = request.user_id,
                    "User already a participant, skipping approval"
                );
                return Outcome::AlreadyMember;
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Error checking member status"),
        }

        if let Err(e) = moderator.approve(request.chat_id, request.user_id).await {
            warn!(
                chat_id = request.chat_id,
                user_id = request.user_id,
                error = %e,
                "Error approving join request"
            );
            return Outcome::Failed;
        }
        info!(
            chat_id = request.chat_id,
            user_id = request.user_id,
            "Approved join request"
        );

        if !self.settings.welcome {
            return Outcome::Approved { welcomed: false };
        }
        let text = render_welcome(&self.settings.welcome_text, request);
        let welcomed = match moderator.welcome(request, &text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    user_id = request.user_id,
                    error = %e,
                    "Error sending welcome message"
                );
                false
            }
        };
        Outcome::Approved { welcomed }
    }
}

/// Substitutes `{mention}` and `{title}` in a welcome template.
pub fn render_welcome(template: &str, request: &JoinRequest) -> String {
    template
        .replace("{mention}", &request.user_name)
        .replace("{title}", &request.chat_title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeModerator {
        member: bool,
        fail_approve: bool,
        fail_welcome: bool,
        approved: Mutex<Vec<(i64, i64)>>,
        welcomed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModerator for FakeModerator {
        async fn is_member(&self, _chat_id: i64, _user_id: i64) -> Result<bool> {
            Ok(self.member)
        }

        async fn approve(&self, chat_id: i64, user_id: i64) -> Result<()> {
            if self.fail_approve {
                anyhow::bail!("CHAT_ADMIN_REQUIRED");
            }
            self.approved.lock().push((chat_id, user_id));
            Ok(())
        }

        async fn welcome(&self, _request: &JoinRequest, text: &str) -> Result<()> {
            if self.fail_welcome {
                anyhow::bail!("bot was blocked by the user");
            }
            self.welcomed.lock().push(text.to_string());
            Ok(())
        }
    }

    fn approver(config: ApprovalConfig) -> (JoinRequestApprover, Arc<Database>) {
        let db = Arc::new(Database::memory());
        let settings = Arc::new(ApprovalSettings::from_config(&ApprovalConfig {
            wait_secs: 0,
            ..config
        }));
        (JoinRequestApprover::new(settings, Arc::clone(&db)), db)
    }

    fn request() -> JoinRequest {
        JoinRequest {
            chat_id: -1001,
            chat_title: "Updates".to_string(),
            user_id: 42,
            user_name: "Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn test_approves_and_welcomes() {
        let (approver, _db) = approver(ApprovalConfig {
            welcome_text: "{mention} joined {title}".to_string(),
            ..ApprovalConfig::default()
        });
        let moderator = FakeModerator::default();

        let outcome = approver.process(&request(), &moderator).await;

        assert_eq!(outcome, Outcome::Approved { welcomed: true });
        assert_eq!(*moderator.approved.lock(), vec![(-1001, 42)]);
        assert_eq!(*moderator.welcomed.lock(), vec!["Ada joined Updates"]);
    }

    #[tokio::test]
    async fn test_skips_when_disabled_globally() {
        let (approver, _db) = approver(ApprovalConfig::default());
        approver.settings().set_enabled(false);
        let moderator = FakeModerator::default();

        let outcome = approver.process(&request(), &moderator).await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Disabled));
        assert!(moderator.approved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_skips_when_approval_off_for_chat() {
        let (approver, db) = approver(ApprovalConfig::default());
        db.set_approval_off(-1001, true).await;

        assert_eq!(
            approver.decide(-1001).await,
            Decision::Skip(SkipReason::ApprovalOff)
        );
        assert_eq!(approver.decide(-1002).await, Decision::Approve);
    }

    #[tokio::test]
    async fn test_skips_unlisted_chats() {
        let (approver, _db) = approver(ApprovalConfig {
            chat_ids: vec![-2000],
            ..ApprovalConfig::default()
        });
        assert_eq!(
            approver.decide(-1001).await,
            Decision::Skip(SkipReason::ChatNotHandled)
        );
        assert_eq!(approver.decide(-2000).await, Decision::Approve);
    }

    #[tokio::test]
    async fn test_existing_member_is_not_approved() {
        let (approver, _db) = approver(ApprovalConfig::default());
        let moderator = FakeModerator {
            member: true,
            ..FakeModerator::default()
        };

        let outcome = approver.process(&request(), &moderator).await;
        assert_eq!(outcome, Outcome::AlreadyMember);
        assert!(moderator.approved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_absorbed() {
        let (approver, _db) = approver(ApprovalConfig::default());

        let moderator = FakeModerator {
            fail_approve: true,
            ..FakeModerator::default()
        };
        assert_eq!(approver.process(&request(), &moderator).await, Outcome::Failed);

        let moderator = FakeModerator {
            fail_welcome: true,
            ..FakeModerator::default()
        };
        assert_eq!(
            approver.process(&request(), &moderator).await,
            Outcome::Approved { welcomed: false }
        );
    }

    #[tokio::test]
    async fn test_no_welcome_when_switched_off() {
        let (approver, _db) = approver(ApprovalConfig {
            welcome: false,
            ..ApprovalConfig::default()
        });
        let moderator = FakeModerator::default();

        assert_eq!(
            approver.process(&request(), &moderator).await,
            Outcome::Approved { welcomed: false }
        );
        assert!(moderator.welcomed.lock().is_empty());
    }

    #[test]
    fn test_wait_is_adjustable() {
        let settings = ApprovalSettings::from_config(&ApprovalConfig::default());
        assert_eq!(settings.wait(), Duration::from_secs(5));
        settings.set_wait_secs(30);
        assert_eq!(settings.wait(), Duration::from_secs(30));
    }
}
