//! ターミナル版の3画面
//!
//! upload → processing → results の順に `Session` を進める。
//! 通知はトーストの代わりに1行ずつ表示する。

pub mod upload;
pub mod processing;
pub mod results;

use prescription_scanner_common::{Notification, NotificationLevel, Session};

fn icon(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "ℹ",
        NotificationLevel::Success => "✔",
        NotificationLevel::Warning => "⚠",
        NotificationLevel::Error => "✖",
    }
}

pub fn format_notification(notification: &Notification) -> String {
    format!(
        "{} {}: {}",
        icon(notification.level),
        notification.title,
        notification.message
    )
}

/// 溜まった通知を表示して捨てる
pub fn print_notifications(session: &mut Session) {
    for notification in session.take_notifications() {
        if notification.level == NotificationLevel::Error {
            tracing::warn!(title = %notification.title, "{}", notification.message);
        }
        println!("{}", format_notification(&notification));
    }
}
